//! Credential Resolver: turns an optional explicit API key plus the
//! process-wide default into the `X-Octopus-ApiKey` request header.

use std::fmt;

use octo_util::{API_KEY_ENV, REDACTED, UserDefaults};
use reqwest::header::{HeaderName, HeaderValue};
use tracing::{debug, error};

use crate::error::{OctoError, OctoResult};

/// Wire name of the authentication header.
pub const API_KEY_HEADER: &str = "X-Octopus-ApiKey";

/// The authentication header for one call. Its `Debug` output never shows the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeyHeader {
    value: HeaderValue,
}

impl ApiKeyHeader {
    /// Build the header from a raw key.
    ///
    /// # Errors
    /// [`OctoError::ConfigInvalid`] when the key is blank or contains bytes
    /// that are not allowed in an HTTP header value.
    pub fn new(api_key: &str) -> OctoResult<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(OctoError::ConfigInvalid {
                setting: "api key",
                reason: "value is blank".into(),
            });
        }
        let mut value = HeaderValue::from_str(api_key).map_err(|error| OctoError::ConfigInvalid {
            setting: "api key",
            reason: error.to_string(),
        })?;
        value.set_sensitive(true);
        Ok(Self { value })
    }

    pub fn name() -> HeaderName {
        HeaderName::from_static("x-octopus-apikey")
    }

    pub fn value(&self) -> &HeaderValue {
        &self.value
    }
}

impl fmt::Debug for ApiKeyHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", API_KEY_HEADER, REDACTED)
    }
}

/// Resolve the API key header.
///
/// A non-blank `explicit_key` always wins; otherwise the default from
/// `defaults` is used. With neither, the error is logged and returned and no
/// request should be attempted.
pub fn resolve_credentials(explicit_key: Option<&str>, defaults: &UserDefaults) -> OctoResult<ApiKeyHeader> {
    if let Some(key) = explicit_key.filter(|key| !key.trim().is_empty()) {
        debug!("using explicit api key");
        return ApiKeyHeader::new(key);
    }
    if let Some(key) = defaults.api_key() {
        debug!(source = ?defaults.api_key_source(), "using default api key");
        return ApiKeyHeader::new(key);
    }

    let missing = OctoError::ConfigMissing {
        setting: "api key",
        env_var: API_KEY_ENV,
    };
    error!("{missing}");
    Err(missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(header: &ApiKeyHeader) -> &str {
        header.value().to_str().unwrap()
    }

    #[test]
    fn explicit_key_ignores_default() {
        let defaults = UserDefaults::new(Some("API-DEFAULT".into()), None);
        let header = resolve_credentials(Some("API-EXPLICIT"), &defaults).unwrap();
        assert_eq!(key_of(&header), "API-EXPLICIT");
    }

    #[test]
    fn blank_explicit_key_falls_back_to_default() {
        let defaults = UserDefaults::new(Some("API-DEFAULT".into()), None);
        let header = resolve_credentials(Some("   "), &defaults).unwrap();
        assert_eq!(key_of(&header), "API-DEFAULT");

        let header = resolve_credentials(None, &defaults).unwrap();
        assert_eq!(key_of(&header), "API-DEFAULT");
    }

    #[test]
    fn nothing_configured_is_config_missing() {
        let error = resolve_credentials(None, &UserDefaults::empty()).unwrap_err();
        assert!(matches!(error, OctoError::ConfigMissing { setting: "api key", .. }));
        assert!(error.to_string().contains(API_KEY_ENV));

        let error = resolve_credentials(Some(""), &UserDefaults::empty()).unwrap_err();
        assert!(matches!(error, OctoError::ConfigMissing { .. }));
    }

    #[test]
    fn control_characters_are_rejected() {
        let error = ApiKeyHeader::new("API-BAD\nKEY").unwrap_err();
        assert!(matches!(error, OctoError::ConfigInvalid { setting: "api key", .. }));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let header = ApiKeyHeader::new("API-SECRETVALUE").unwrap();
        let rendered = format!("{header:?}");
        assert!(!rendered.contains("SECRETVALUE"));
        assert!(rendered.contains(API_KEY_HEADER));
        assert!(header.value().is_sensitive());
    }
}
