//! # HTTP Utilities
//!
//! Response helpers shared by the lookup client: status hints and strict JSON
//! parsing that keeps enough context to debug a bad body.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::text_processing::redact_sensitive;

/// Longest body preview kept in errors, in bytes before the ellipsis.
pub const BODY_PREVIEW_LIMIT: usize = 200;

/// Return a user-friendly hint for common HTTP status codes.
///
/// # Example
/// ```rust
/// use octo_util::http::status_error_message;
///
/// let error_401 = status_error_message(401).unwrap();
/// assert!(error_401.contains("OCTOPUS_API_KEY"));
///
/// assert!(status_error_message(500).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        401 => Some("Unauthorized (401). Hint: pass --api-key or set OCTOPUS_API_KEY=...".into()),
        403 => Some("Forbidden (403). Hint: the API key's user lacks permission for this resource".into()),
        404 => Some("Not Found (404). Hint: check the server address and any ids in the path".into()),
        _ => None,
    }
}

/// Parse HTTP response text into JSON, providing detailed errors on failure.
///
/// The error carries the originating status and a redacted, whitespace
/// collapsed preview of the body (see [`response_preview`]).
pub fn parse_response_json_strict(text: &str, status: Option<StatusCode>) -> Result<Value, JsonParseError> {
    serde_json::from_str::<Value>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());

        JsonParseError::new(status_note, error, response_preview(text))
    })
}

/// Redact and truncate a response body for inclusion in logs and errors.
pub fn response_preview(text: &str) -> String {
    truncate_response_preview(&redact_sensitive(text), BODY_PREVIEW_LIMIT)
}

fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Error returned when strict JSON parsing of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to parse JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    /// Access the truncated response preview captured during parsing.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_parse_accepts_arrays_and_objects() {
        assert!(parse_response_json_strict("[]", None).unwrap().is_array());
        assert!(parse_response_json_strict(r#"{"Items": []}"#, None).unwrap().is_object());
    }

    #[test]
    fn strict_parse_reports_status_and_preview() {
        let error = parse_response_json_strict("<html>\n<body>maintenance</body>", Some(StatusCode::OK)).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("status 200 OK"));
        assert_eq!(error.body_preview(), "<html> <body>maintenance</body>");
    }

    #[test]
    fn empty_body_preview_is_marked() {
        let error = parse_response_json_strict("   ", None).unwrap_err();
        assert_eq!(error.body_preview(), "<empty>");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let preview = response_preview(&body);
        assert_eq!(preview.len(), BODY_PREVIEW_LIMIT + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn previews_never_leak_keys() {
        let preview = response_preview("invalid key API-ABCDEFGHIJKLMNOPQRSTUV supplied");
        assert!(!preview.contains("API-ABCDEFGHIJKLMNOPQRSTUV"));
    }
}
