/// Rewrites an older version embedded in `text` to `new_version`.
///
/// Known versions equal to `new_version` are ignored. Among the remaining
/// ones, the longest that appears as a whole token is replaced everywhere it
/// appears as a whole token. A token is bounded by the string ends or by a
/// non-alphanumeric character; a `.` touching a digit on its far side
/// continues the version and is not a boundary.
pub fn substitute_version<I>(text: &str, known_versions: I, new_version: &str) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut chosen: Option<String> = None;
    for known in known_versions {
        let known = known.as_ref();
        if known.is_empty() || known == new_version {
            continue;
        }
        if chosen
            .as_ref()
            .is_some_and(|current| current.len() >= known.len())
        {
            continue;
        }
        if bounded_occurrences(text, known).next().is_some() {
            chosen = Some(known.to_string());
        }
    }

    let Some(token) = chosen else {
        return text.to_string();
    };

    let mut rewritten = String::with_capacity(text.len());
    let mut copied_up_to = 0;
    for start in bounded_occurrences(text, &token) {
        rewritten.push_str(&text[copied_up_to..start]);
        rewritten.push_str(new_version);
        copied_up_to = start + token.len();
    }
    rewritten.push_str(&text[copied_up_to..]);
    rewritten
}

fn bounded_occurrences<'a>(text: &'a str, token: &'a str) -> impl Iterator<Item = usize> + 'a {
    text.match_indices(token)
        .map(|(start, _)| start)
        .filter(move |&start| {
            starts_token(&text[..start]) && ends_token(&text[start + token.len()..])
        })
}

fn starts_token(before: &str) -> bool {
    let mut chars = before.chars().rev();
    match chars.next() {
        None => true,
        Some('.') => !chars.next().is_some_and(|ch| ch.is_ascii_digit()),
        Some(ch) => !ch.is_alphanumeric(),
    }
}

fn ends_token(after: &str) -> bool {
    let mut chars = after.chars();
    match chars.next() {
        None => true,
        Some('.') => !chars.next().is_some_and(|ch| ch.is_ascii_digit()),
        Some(ch) => !ch.is_alphanumeric(),
    }
}
