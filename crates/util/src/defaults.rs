//! Process-wide connection defaults for the Octopus lookup client.
//!
//! The defaults are user-scoped and read-only from this crate's point of
//! view: an operator sets them once and every lookup falls back to them when
//! the caller does not pass an explicit API key or server. Sources, in order:
//!
//! 1. `OCTOPUS_API_KEY` / `OCTOPUS_SERVER` environment variables
//! 2. for the API key, the OS keychain when `OCTO_SECRETS_BACKEND=keychain`
//! 3. a JSON file at `$OCTO_DEFAULTS_PATH` or `~/.config/octo/defaults.json`

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::expand_tilde;
use crate::text_processing::REDACTED;

/// Environment variable holding the default API key.
pub const API_KEY_ENV: &str = "OCTOPUS_API_KEY";

/// Environment variable holding the default server address.
pub const SERVER_ENV: &str = "OCTOPUS_SERVER";

/// Environment variable allowing callers to override the defaults file path.
pub const DEFAULTS_PATH_ENV: &str = "OCTO_DEFAULTS_PATH";

/// Environment variable used to select the secret resolution backend.
pub const SECRETS_BACKEND_ENV: &str = "OCTO_SECRETS_BACKEND";

/// Default filename for the JSON payload.
pub const DEFAULTS_FILE_NAME: &str = "defaults.json";

static KEYCHAIN_SERVICE: &str = "octo";
static KEYCHAIN_ACCOUNT: &str = "api-key";

/// Where a default value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultSource {
    Environment,
    Keychain,
    File,
}

/// Secret resolution backend for the default API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretsBackend {
    /// Only the environment and the defaults file are consulted.
    Environment,
    /// The OS keychain (`keyring-rs`) is consulted between the two.
    Keychain,
}

impl SecretsBackend {
    fn from_env_var(raw: Option<String>) -> Self {
        match raw.unwrap_or_default().trim().to_ascii_lowercase().as_str() {
            "keychain" | "keyring" => Self::Keychain,
            _ => Self::Environment,
        }
    }
}

/// Determine the currently configured secrets backend.
pub fn secrets_backend() -> SecretsBackend {
    SecretsBackend::from_env_var(env::var(SECRETS_BACKEND_ENV).ok())
}

/// On-disk layout of the defaults file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DefaultsFile {
    pub api_key: Option<String>,
    pub server: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
struct DefaultValue {
    value: String,
    source: DefaultSource,
}

/// Resolved process-wide defaults.
///
/// Build one with [`UserDefaults::load`] at the edge of the program, or with
/// [`UserDefaults::new`]/[`UserDefaults::empty`] in tests, and hand it to the
/// client. Nothing below the edge reads the environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserDefaults {
    api_key: Option<DefaultValue>,
    server: Option<DefaultValue>,
}

impl UserDefaults {
    /// Defaults with nothing configured.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Defaults built from in-memory values, treated as file-sourced.
    pub fn new(api_key: Option<String>, server: Option<String>) -> Self {
        Self {
            api_key: non_blank(api_key).map(|value| DefaultValue {
                value,
                source: DefaultSource::File,
            }),
            server: non_blank(server).map(|value| DefaultValue {
                value,
                source: DefaultSource::File,
            }),
        }
    }

    /// Load the defaults from the environment, keychain and defaults file.
    pub fn load() -> Self {
        let path = default_defaults_path();
        let file = load_defaults_file(&path);

        let api_key = from_env(API_KEY_ENV)
            .or_else(|| match secrets_backend() {
                SecretsBackend::Keychain => keychain_api_key(),
                SecretsBackend::Environment => None,
            })
            .or_else(|| {
                non_blank(file.api_key.clone()).map(|value| DefaultValue {
                    value,
                    source: DefaultSource::File,
                })
            });

        let server = from_env(SERVER_ENV).or_else(|| {
            non_blank(file.server).map(|value| DefaultValue {
                value,
                source: DefaultSource::File,
            })
        });

        debug!(
            api_key_source = ?api_key.as_ref().map(|value| value.source),
            server_source = ?server.as_ref().map(|value| value.source),
            "loaded connection defaults"
        );
        Self { api_key, server }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|default| default.value.as_str())
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_ref().map(|default| default.value.as_str())
    }

    pub fn api_key_source(&self) -> Option<DefaultSource> {
        self.api_key.as_ref().map(|default| default.source)
    }

    pub fn server_source(&self) -> Option<DefaultSource> {
        self.server.as_ref().map(|default| default.source)
    }
}

impl fmt::Debug for UserDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDefaults")
            .field("api_key", &self.api_key.as_ref().map(|default| (REDACTED, default.source)))
            .field("server", &self.server.as_ref().map(|default| (&default.value, default.source)))
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|candidate| !candidate.trim().is_empty())
}

fn from_env(name: &str) -> Option<DefaultValue> {
    non_blank(env::var(name).ok()).map(|value| DefaultValue {
        value,
        source: DefaultSource::Environment,
    })
}

fn keychain_api_key() -> Option<DefaultValue> {
    let entry = match keyring::Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_ACCOUNT) {
        Ok(entry) => entry,
        Err(error) => {
            warn!(%error, "keychain unavailable");
            return None;
        }
    };
    match entry.get_password() {
        Ok(password) => non_blank(Some(password)).map(|value| DefaultValue {
            value,
            source: DefaultSource::Keychain,
        }),
        Err(keyring::Error::NoEntry) => None,
        Err(error) => {
            warn!(%error, "keychain error");
            None
        }
    }
}

/// Path of the user-scoped defaults file.
pub fn default_defaults_path() -> PathBuf {
    if let Ok(path) = env::var(DEFAULTS_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("octo")
        .join(DEFAULTS_FILE_NAME)
}

fn load_defaults_file(path: &Path) -> DefaultsFile {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse defaults file; ignoring it"
                );
                DefaultsFile::default()
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => DefaultsFile::default(),
        Err(error) => {
            warn!(
                path = %path.display(),
                error = %error,
                "Failed to read defaults file; ignoring it"
            );
            DefaultsFile::default()
        }
    }
}
