//! Client for the alwaysdata REST API.
//!
//! Every call issues exactly one authenticated `GET {endpoint}/v1/{resource}/{id}`
//! and decodes the JSON body into a typed record. Authentication is HTTP basic
//! auth with the API key as user name and an empty password.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::api::Database;
use crate::error::ClientError;

/// Default alwaysdata API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.alwaysdata.com";

/// Options used to build an [`Alwaysdata`] client.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Base URL of the API, without the `/v1` suffix.
    pub endpoint: String,
    /// API key sent as the basic auth user name.
    pub api_key: String,
    /// Overall request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            timeout: None,
        }
    }
}

impl ClientOptions {
    /// Create options for the default endpoint with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// The API key must never end up in logs.
impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Authenticated alwaysdata API client.
#[derive(Debug, Clone)]
pub struct Alwaysdata {
    http: Client,
    opts: ClientOptions,
}

impl Alwaysdata {
    /// Build a client with its own HTTP connection pool.
    ///
    /// Fails when the API key is empty or the endpoint is not an http(s) URL.
    pub fn new(opts: ClientOptions) -> Result<Self, ClientError> {
        check_api_key(&opts.api_key)?;
        check_endpoint(&opts.endpoint)?;

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = opts.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_http_client(builder.build()?, opts))
    }

    /// Build a client on top of an existing HTTP client.
    pub fn with_http_client(http: Client, mut opts: ClientOptions) -> Self {
        let trimmed = opts.endpoint.trim_end_matches('/').len();
        opts.endpoint.truncate(trimmed);
        Self { http, opts }
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.opts.endpoint
    }

    /// URL of a single API object.
    pub fn resource_url(&self, resource: &str, id: u64) -> String {
        format!("{}/v1/{}/{}", self.opts.endpoint, resource, id)
    }

    /// Fetch a single API object and decode it.
    #[instrument(skip(self), fields(endpoint = %self.opts.endpoint))]
    pub async fn get<T: DeserializeOwned>(&self, resource: &str, id: u64) -> Result<T, ClientError> {
        let url = self.resource_url(resource, id);
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.opts.api_key, Some(""))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = %status, url = %url, "alwaysdata API returned an error status");
            return Err(ClientError::Status { status, url });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(ClientError::Decode)
    }

    /// Fetch a database by identifier.
    pub async fn get_database(&self, id: u64) -> Result<Database, ClientError> {
        self.get("database", id).await
    }
}

/// Check that an API key is usable.
pub fn check_api_key(api_key: &str) -> Result<(), ClientError> {
    if api_key.is_empty() {
        return Err(ClientError::MissingApiKey);
    }
    Ok(())
}

/// Check that an endpoint is an http(s) base URL without query or fragment.
pub fn check_endpoint(endpoint: &str) -> Result<(), ClientError> {
    let invalid = |reason: String| ClientError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let url = Url::parse(endpoint).map_err(|e| invalid(format!("not a valid URL ({})", e)))?;
    match url.scheme() {
        "http" | "https" => {},
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not carry a query or fragment".to_string()));
    }
    Ok(())
}
