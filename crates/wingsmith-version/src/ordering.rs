use std::cmp::Ordering;
use std::fmt;

/// One dot-separated component of a version string.
///
/// The numeric prefix is kept as its digit run with leading zeros removed, so
/// arbitrarily long components compare without overflowing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionPart {
    digits: String,
    suffix: String,
    original: String,
}

impl VersionPart {
    pub fn parse(part: &str) -> Self {
        let split = part
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(part.len());
        let (digits, suffix) = part.split_at(split);
        Self {
            digits: digits.trim_start_matches('0').to_string(),
            suffix: suffix.to_string(),
            original: part.to_string(),
        }
    }

    fn zero() -> Self {
        Self::parse("0")
    }

    /// Numeric value without leading zeros; empty means zero.
    pub fn numeric(&self) -> &str {
        &self.digits
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        let numeric = self
            .digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(&other.digits));
        if numeric != Ordering::Equal {
            return numeric;
        }

        match (self.suffix.is_empty(), other.suffix.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.suffix.cmp(&other.suffix),
        }
    }
}

/// A version string split into naturally ordered parts.
///
/// Equality follows the natural ordering, so `1.01` equals `1.1` and `1.0`
/// equals `1.0.0`, while [`VersionToken::as_str`] keeps the literal input.
#[derive(Debug, Clone)]
pub struct VersionToken {
    original: String,
    parts: Vec<VersionPart>,
}

impl VersionToken {
    pub fn parse(version: &str) -> Self {
        Self {
            original: version.to_string(),
            parts: version.split('.').map(VersionPart::parse).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn parts(&self) -> &[VersionPart] {
        &self.parts
    }

    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        let zero = VersionPart::zero();
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|index| {
                let left = self.parts.get(index).unwrap_or(&zero);
                let right = other.parts.get(index).unwrap_or(&zero);
                left.natural_cmp(right)
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialEq for VersionToken {
    fn eq(&self, other: &Self) -> bool {
        self.natural_cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionToken {}

impl PartialOrd for VersionToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionToken {
    fn cmp(&self, other: &Self) -> Ordering {
        self.natural_cmp(other)
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .parts
            .iter()
            .map(VersionPart::as_str)
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&joined)
    }
}

pub fn compare_versions(left: &str, right: &str) -> Ordering {
    VersionToken::parse(left).natural_cmp(&VersionToken::parse(right))
}

/// Returns the naturally greatest version, keeping the first one seen among
/// equal candidates.
pub fn highest_version<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut highest: Option<(&'a str, VersionToken)> = None;
    for version in versions {
        let token = VersionToken::parse(version);
        let replace = highest
            .as_ref()
            .map(|(_, current)| token.natural_cmp(current) == Ordering::Greater)
            .unwrap_or(true);
        if replace {
            highest = Some((version, token));
        }
    }
    highest.map(|(version, _)| version)
}
