//! # Text Processing Utilities
//!
//! Secret redaction for anything that may end up in a log line or an error
//! message, and the comma list formatter used to flatten lookup results.

use std::convert::Infallible;

use once_cell::sync::Lazy;
use regex::Regex;

/// Token substituted for redacted values.
pub const REDACTED: &str = "[REDACTED]";

/// Redacts values that look like secrets in a string.
///
/// Covers the `X-Octopus-ApiKey` header, `apikey` query parameters,
/// `*_KEY=`/`*_TOKEN=` style assignments and bare Octopus API keys
/// (`API-` followed by a long upper-case alphanumeric run).
///
/// # Example
/// ```rust
/// use octo_util::text_processing::redact_sensitive;
///
/// let input = "X-Octopus-ApiKey: API-ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// assert_eq!(redact_sensitive(input), "X-Octopus-ApiKey: [REDACTED]");
///
/// let input = "OCTOPUS_API_KEY=hunter2";
/// assert_eq!(redact_sensitive(input), "OCTOPUS_API_KEY=[REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    redact_sensitive_with(input, REDACTED)
}

/// Redacts sensitive-looking values, using a custom replacement token.
pub fn redact_sensitive_with(input: &str, replacement: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in get_redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{}{}", prefix, replacement)
            })
            .to_string();
    }

    redacted
}

/// Returns compiled regex patterns for detecting sensitive information.
///
/// Each pattern captures the non-secret prefix in group 1 so the key name
/// survives redaction. Bare keys have an empty prefix group.
pub fn get_redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(build_redact_patterns);

    &REDACT_PATTERNS
}

fn build_redact_patterns() -> Vec<Regex> {
    [
        r"(?i)(x-octopus-apikey\s*[:=]\s*)[^\s,;]+",
        r"(?i)([?&]apikey=)[^&\s]+",
        r"(?i)(\b[A-Z0-9_]*(?:KEY|TOKEN|SECRET|PASSWORD)=)[^\s&]+",
        r"()\bAPI-[A-Z0-9]{16,}\b",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
}

/// Joins a sequence into one comma-delimited string, consuming it one item at
/// a time.
///
/// The first item seeds the result and each later item is appended after a
/// `,`. An empty sequence yields `None`. Items are not escaped, so an item
/// that itself contains a comma makes the output ambiguous.
///
/// # Example
/// ```rust
/// use octo_util::text_processing::join_list;
///
/// assert_eq!(join_list(["a", "b", "c"]).as_deref(), Some("a,b,c"));
/// assert_eq!(join_list(["a"]).as_deref(), Some("a"));
/// assert_eq!(join_list(Vec::<String>::new()), None);
/// ```
pub fn join_list<I, S>(items: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match try_join_list(items.into_iter().map(Ok::<S, Infallible>)) {
        Ok(joined) => joined,
        Err(never) => match never {},
    }
}

/// Fallible form of [`join_list`] for sources such as stdin lines, stopping at
/// the first error.
pub fn try_join_list<I, S, E>(items: I) -> Result<Option<String>, E>
where
    I: IntoIterator<Item = Result<S, E>>,
    S: AsRef<str>,
{
    let mut accumulator: Option<String> = None;
    for item in items {
        let item = item?;
        match accumulator.as_mut() {
            Some(joined) => {
                joined.push(',');
                joined.push_str(item.as_ref());
            }
            None => accumulator = Some(item.as_ref().to_string()),
        }
    }
    Ok(accumulator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_api_key_header() {
        let input = "X-Octopus-ApiKey: API-0123456789ABCDEFGHIJ";
        assert_eq!(redact_sensitive(input), "X-Octopus-ApiKey: [REDACTED]");
    }

    #[test]
    fn redacts_query_parameter_and_keeps_the_rest() {
        let input = "GET https://deploy.example/api/machines/all?apikey=secret&take=10";
        assert_eq!(
            redact_sensitive(input),
            "GET https://deploy.example/api/machines/all?apikey=[REDACTED]&take=10"
        );
    }

    #[test]
    fn redacts_bare_octopus_keys() {
        let input = "body echoed API-ABCDEFGHIJKLMNOPQRSTUV back";
        assert_eq!(redact_sensitive(input), "body echoed [REDACTED] back");
    }

    #[test]
    fn leaves_ordinary_text_alone() {
        let input = "no machines matched role web";
        assert_eq!(redact_sensitive(input), input);
    }

    #[test]
    fn joins_in_order_without_stray_separators() {
        assert_eq!(join_list(["a", "b", "c"]).as_deref(), Some("a,b,c"));
        assert_eq!(join_list(["a"]).as_deref(), Some("a"));
        assert_eq!(join_list(Vec::<&str>::new()), None);
    }

    #[test]
    fn join_does_not_escape_embedded_commas() {
        assert_eq!(join_list(["a,b", "c"]).as_deref(), Some("a,b,c"));
    }

    #[test]
    fn join_keeps_empty_items() {
        assert_eq!(join_list(["", "b"]).as_deref(), Some(",b"));
    }

    #[test]
    fn try_join_stops_at_first_error() {
        let items = vec![Ok("a".to_string()), Err("boom"), Ok("c".to_string())];
        assert_eq!(try_join_list(items), Err("boom"));

        let items: Vec<Result<String, &str>> = vec![Ok("a".into()), Ok("b".into())];
        assert_eq!(try_join_list(items), Ok(Some("a,b".to_string())));
    }
}
