use octo_util::http::JsonParseError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the resolvers, the query executor and the lookups.
#[derive(Debug, Error)]
pub enum OctoError {
    /// Neither an explicit value nor a process-wide default was available.
    #[error("missing {setting}: pass it explicitly or set {env_var}")]
    ConfigMissing { setting: &'static str, env_var: &'static str },

    /// A resolved value cannot be used to build a header or URL.
    #[error("invalid {setting}: {reason}")]
    ConfigInvalid { setting: &'static str, reason: String },

    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The single GET request did not produce a usable JSON body.
    #[error("GET {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: RequestFailure,
    },
}

impl OctoError {
    pub(crate) fn request_failed(url: &str, source: RequestFailure) -> Self {
        Self::RequestFailed {
            url: url.to_string(),
            source,
        }
    }

    /// A user-facing hint for well-known failures, if one applies.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::RequestFailed {
                source: RequestFailure::Status { hint, .. },
                ..
            } => hint.as_deref(),
            _ => None,
        }
    }
}

/// What went wrong inside a failed request.
#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("server returned {status}: {body_preview}")]
    Status {
        status: StatusCode,
        hint: Option<String>,
        body_preview: String,
    },

    #[error(transparent)]
    Body(#[from] JsonParseError),

    #[error("response does not match the endpoint's list shape: {0}")]
    Shape(#[source] serde_json::Error),
}

pub type OctoResult<T> = Result<T, OctoError>;
