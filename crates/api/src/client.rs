//! HTTP Query Executor and the per-call client built on it.

use std::env;

use octo_types::ListResponse;
use octo_util::http::{parse_response_json_strict, response_preview, status_error_message};
use reqwest::{Client, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::credentials::{ApiKeyHeader, resolve_credentials};
use crate::endpoint::resolve_endpoint;
use crate::error::{OctoError, OctoResult, RequestFailure};
use crate::paths::ApiPath;
use crate::settings::ConnectionSettings;

/// Result of one executed query: the decoded JSON body.
pub type QueryResult = OctoResult<Value>;

/// Issue one GET against `base + path` with the API key header attached and
/// decode the body as JSON.
///
/// The URL is a plain concatenation; callers supply the exact path. Transport
/// errors, non-2xx statuses and unparsable bodies all come back as
/// [`OctoError::RequestFailed`]. No retries, and no timeout beyond the
/// transport default.
pub async fn get_json(http: &Client, base: &str, path: &str, api_key: &ApiKeyHeader) -> QueryResult {
    let url = format!("{}{}", base, path);
    debug!(%url, "GET");

    let response = http
        .get(&url)
        .header(ApiKeyHeader::name(), api_key.value().clone())
        .send()
        .await
        .map_err(|e| OctoError::request_failed(&url, RequestFailure::Transport(e)))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| OctoError::request_failed(&url, RequestFailure::Transport(e)))?;

    if !status.is_success() {
        return Err(OctoError::request_failed(
            &url,
            RequestFailure::Status {
                status,
                hint: status_error_message(status.as_u16()),
                body_preview: response_preview(&text),
            },
        ));
    }

    parse_response_json_strict(&text, Some(status)).map_err(|e| OctoError::request_failed(&url, RequestFailure::Body(e)))
}

/// Build the `reqwest::Client` used for lookups.
///
/// Only `Accept` and `User-Agent` are preset; the API key travels per request.
pub fn build_http_client() -> OctoResult<Client> {
    let mut default_headers = header::HeaderMap::new();
    default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

    Client::builder()
        .default_headers(default_headers)
        .user_agent(user_agent())
        .build()
        .map_err(OctoError::HttpClient)
}

fn user_agent() -> String {
    format!("octo/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS)
}

/// A resolved server address plus API key, good for the queries of one call.
#[derive(Debug, Clone)]
pub struct OctoClient {
    pub base_url: String,
    pub http: Client,
    api_key: ApiKeyHeader,
}

impl OctoClient {
    /// Resolve credentials and endpoint from `settings` and build a client.
    ///
    /// Fails with [`OctoError::ConfigMissing`] before any network activity
    /// when either value cannot be resolved.
    pub fn connect(settings: &ConnectionSettings) -> OctoResult<Self> {
        let api_key = resolve_credentials(settings.api_key.as_deref(), &settings.defaults)?;
        let base_url = resolve_endpoint(settings.server.as_deref(), &settings.defaults)?;
        Self::new(base_url, api_key)
    }

    pub fn new(base_url: impl Into<String>, api_key: ApiKeyHeader) -> OctoResult<Self> {
        Ok(Self {
            base_url: base_url.into(),
            http: build_http_client()?,
            api_key,
        })
    }

    /// Run the query executor against `path`.
    pub async fn get_json(&self, path: &str) -> QueryResult {
        get_json(&self.http, &self.base_url, path, &self.api_key).await
    }

    /// Fetch a list endpoint and decode it with the shape the endpoint declares.
    pub async fn get_list<T: DeserializeOwned>(&self, path: &ApiPath) -> OctoResult<Vec<T>> {
        let value = self.get_json(path.as_str()).await?;
        let items = ListResponse::<T>::decode(value, path.shape())
            .map_err(|e| OctoError::request_failed(&format!("{}{}", self.base_url, path.as_str()), RequestFailure::Shape(e)))?
            .into_items();
        debug!(path = path.as_str(), count = items.len(), "decoded list response");
        Ok(items)
    }
}
