use std::fmt;

use octo_util::{REDACTED, UserDefaults};

/// Explicit connection values for one lookup, with the process-wide defaults
/// they fall back to.
///
/// The lookups never read the environment themselves; build the defaults at
/// the edge of the program with [`ConnectionSettings::from_user_defaults`].
#[derive(Clone, Default)]
pub struct ConnectionSettings {
    pub api_key: Option<String>,
    pub server: Option<String>,
    pub defaults: UserDefaults,
}

impl ConnectionSettings {
    pub fn new(defaults: UserDefaults) -> Self {
        Self {
            api_key: None,
            server: None,
            defaults,
        }
    }

    /// Settings backed by [`UserDefaults::load`].
    pub fn from_user_defaults() -> Self {
        Self::new(UserDefaults::load())
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("server", &self.server)
            .field("api_key_default", &self.defaults.api_key_source())
            .field("server_default", &self.defaults.server())
            .finish()
    }
}
