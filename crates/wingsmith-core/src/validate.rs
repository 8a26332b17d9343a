//! Checks applied to caller-supplied values before they reach reconciliation.

use anyhow::anyhow;

const FORBIDDEN_PATH_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

const PACKAGE_IDENTIFIER_MIN_LEN: usize = 4;
const PACKAGE_IDENTIFIER_MAX_LEN: usize = 128;
const PACKAGE_IDENTIFIER_SEGMENT_MAX_LEN: usize = 32;
const PACKAGE_IDENTIFIER_MAX_SEGMENTS: usize = 8;
const PACKAGE_VERSION_MAX_LEN: usize = 128;
const FILE_EXTENSIONS_MAX_ITEMS: usize = 512;
const FILE_EXTENSION_MAX_LEN: usize = 64;
const PROTOCOLS_MAX_ITEMS: usize = 64;
const PROTOCOL_MAX_LEN: usize = 2048;

fn is_forbidden(ch: char) -> bool {
    FORBIDDEN_PATH_CHARS.contains(&ch) || ('\u{1}'..='\u{1f}').contains(&ch)
}

pub fn validate_package_identifier(identifier: &str) -> anyhow::Result<()> {
    let length = identifier.chars().count();
    if !(PACKAGE_IDENTIFIER_MIN_LEN..=PACKAGE_IDENTIFIER_MAX_LEN).contains(&length) {
        return Err(anyhow!(
            "package identifier must be between {PACKAGE_IDENTIFIER_MIN_LEN} and {PACKAGE_IDENTIFIER_MAX_LEN} characters: {identifier}"
        ));
    }

    let segments = identifier.split('.').collect::<Vec<_>>();
    if segments.len() < 2 || segments.len() > PACKAGE_IDENTIFIER_MAX_SEGMENTS {
        return Err(anyhow!(
            "package identifier must have between 2 and {PACKAGE_IDENTIFIER_MAX_SEGMENTS} dot-separated segments: {identifier}"
        ));
    }
    for segment in segments {
        let segment_len = segment.chars().count();
        if segment_len == 0 || segment_len > PACKAGE_IDENTIFIER_SEGMENT_MAX_LEN {
            return Err(anyhow!(
                "package identifier segment '{segment}' must be between 1 and {PACKAGE_IDENTIFIER_SEGMENT_MAX_LEN} characters"
            ));
        }
        if segment
            .chars()
            .any(|ch| ch.is_whitespace() || is_forbidden(ch))
        {
            return Err(anyhow!(
                "package identifier contains invalid character(s): {identifier}"
            ));
        }
    }

    Ok(())
}

pub fn validate_package_version(version: &str) -> anyhow::Result<()> {
    if version.trim().is_empty() {
        return Err(anyhow!("package version must not be empty"));
    }
    if version.chars().count() > PACKAGE_VERSION_MAX_LEN {
        return Err(anyhow!(
            "package version must be at most {PACKAGE_VERSION_MAX_LEN} characters: {version}"
        ));
    }
    if version.chars().any(is_forbidden) {
        return Err(anyhow!(
            "package version contains invalid character(s): {version}"
        ));
    }
    Ok(())
}

pub fn validate_file_extensions(extensions: &[String]) -> anyhow::Result<()> {
    if extensions.len() > FILE_EXTENSIONS_MAX_ITEMS {
        return Err(anyhow!(
            "at most {FILE_EXTENSIONS_MAX_ITEMS} file extensions are allowed, got {}",
            extensions.len()
        ));
    }
    for extension in extensions {
        let length = extension.chars().count();
        if length == 0 || length > FILE_EXTENSION_MAX_LEN {
            return Err(anyhow!(
                "file extension '{extension}' must be between 1 and {FILE_EXTENSION_MAX_LEN} characters"
            ));
        }
        if extension.chars().any(is_forbidden) {
            return Err(anyhow!(
                "file extension contains invalid character(s): {extension}"
            ));
        }
    }
    Ok(())
}

pub fn validate_protocols(protocols: &[String]) -> anyhow::Result<()> {
    if protocols.len() > PROTOCOLS_MAX_ITEMS {
        return Err(anyhow!(
            "at most {PROTOCOLS_MAX_ITEMS} protocols are allowed, got {}",
            protocols.len()
        ));
    }
    for protocol in protocols {
        let length = protocol.chars().count();
        if length == 0 || length > PROTOCOL_MAX_LEN {
            return Err(anyhow!(
                "protocol '{protocol}' must be between 1 and {PROTOCOL_MAX_LEN} characters"
            ));
        }
    }
    Ok(())
}

pub fn validate_sha256(sha256: &str) -> anyhow::Result<()> {
    if sha256.len() != 64 || !sha256.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(anyhow!(
            "sha256 must be 64 hexadecimal characters: {sha256}"
        ));
    }
    Ok(())
}

/// Accepts calendar dates written as `YYYY-MM-DD`.
pub fn validate_release_date(date: &str) -> anyhow::Result<()> {
    let invalid = || anyhow!("release date must be formatted as YYYY-MM-DD: {date}");

    let mut fields = date.split('-');
    let (Some(year), Some(month), Some(day), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(invalid());
    };
    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return Err(invalid());
    }
    let year: u32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => return Err(invalid()),
    };
    if day == 0 || day > days_in_month {
        return Err(invalid());
    }
    Ok(())
}
