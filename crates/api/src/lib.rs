//! Octopus Deploy lookup client.
//!
//! A thin layer over the server's REST API that answers a handful of
//! questions: which environments exist, which deployment targets sit in an
//! environment or carry a role, which target owns a thumbprint or a host
//! name, and which projects share a name. It focuses on:
//!
//! - Resolving the API key and server address from explicit values or the
//!   process-wide defaults in [`octo_util::UserDefaults`]
//! - Issuing exactly one `GET` per lookup with the `X-Octopus-ApiKey` header
//! - Decoding each route with the list shape it is documented to return
//!
//! # Example
//!
//! ```ignore
//! use octo_api::{ConnectionSettings, lookups};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), octo_api::OctoError> {
//!     let settings = ConnectionSettings::from_user_defaults().with_server("deploy.example.com");
//!     for name in lookups::machines_in_role(&settings, "web", true).await? {
//!         println!("{name}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod lookups;
pub mod paths;
pub mod settings;

pub use client::{OctoClient, QueryResult, build_http_client, get_json};
pub use credentials::{API_KEY_HEADER, ApiKeyHeader, resolve_credentials};
pub use endpoint::{normalize_server_address, resolve_endpoint};
pub use error::{OctoError, OctoResult, RequestFailure};
pub use lookups::{
    MachineFilter, list_environments, machines_by_tentacle_name, machines_by_thumbprint, machines_in_environment,
    machines_in_role, machines_in_role_and_environment, project_by_name, select_machines,
};
pub use paths::ApiPath;
pub use settings::ConnectionSettings;
