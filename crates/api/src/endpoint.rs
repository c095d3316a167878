//! Endpoint Resolver: picks the server address and checks it can serve as a
//! URL prefix.

use octo_util::{SERVER_ENV, UserDefaults};
use reqwest::Url;
use tracing::{debug, error};

use crate::error::{OctoError, OctoResult};

/// Resolve the base server address.
///
/// A non-blank `explicit_server` always wins over the default. A bare DNS name
/// gets an `https://` scheme; anything else is kept as given, trailing slash
/// included, since paths are appended verbatim.
pub fn resolve_endpoint(explicit_server: Option<&str>, defaults: &UserDefaults) -> OctoResult<String> {
    if let Some(server) = explicit_server.filter(|server| !server.trim().is_empty()) {
        debug!("using explicit server");
        return normalize_server_address(server);
    }
    if let Some(server) = defaults.server() {
        debug!(source = ?defaults.server_source(), "using default server");
        return normalize_server_address(server);
    }

    let missing = OctoError::ConfigMissing {
        setting: "server",
        env_var: SERVER_ENV,
    };
    error!("{missing}");
    Err(missing)
}

/// Turn a DNS name or address into a base URL string.
///
/// Rules:
/// - no `://`: treated as a host name and prefixed with `https://`
/// - the result must parse, use `http` or `https`, and include a host
pub fn normalize_server_address(server: &str) -> OctoResult<String> {
    let server = server.trim();
    let base = if server.contains("://") {
        server.to_string()
    } else {
        format!("https://{server}")
    };

    let parsed = Url::parse(&base).map_err(|e| invalid(format!("'{base}' is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("scheme must be http or https; got '{}://'", parsed.scheme())));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid(format!("'{base}' must include a host")));
    }

    Ok(base)
}

fn invalid(reason: String) -> OctoError {
    OctoError::ConfigInvalid {
        setting: "server",
        reason,
    }
}
