//! Error types for the alwaysdata provider.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised by the alwaysdata API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No API key was configured.
    #[error("alwaysdata API key could not be empty")]
    MissingApiKey,

    /// The configured endpoint is not a usable base URL.
    #[error("invalid alwaysdata endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The rejected endpoint.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The request could not be sent or the body could not be read.
    #[error("request to alwaysdata API failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("http response {status} with {url}")]
    Status {
        /// The status returned by the API.
        status: StatusCode,
        /// The requested URL.
        url: String,
    },

    /// The response body is not the expected JSON document.
    #[error("unable to decode alwaysdata API response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientError {
    /// The HTTP status carried by this error, if the API answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors surfaced by provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested remote object was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Permission denied (authentication/authorization failure).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Quota or rate limit exceeded.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The API is unreachable or failing.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The API did not answer in time.
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Any other API failure.
    #[error("API error: {0}")]
    Api(String),
}

impl ProviderError {
    /// Get the error message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Configuration(msg)
            | Self::UnknownResource(msg)
            | Self::PermissionDenied(msg)
            | Self::ResourceExhausted(msg)
            | Self::Unavailable(msg)
            | Self::DeadlineExceeded(msg)
            | Self::Api(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
        }
    }
}

impl From<ClientError> for ProviderError {
    fn from(err: ClientError) -> Self {
        let msg = format!("Unable to read database, got error: {}", err);
        match &err {
            ClientError::MissingApiKey | ClientError::InvalidEndpoint { .. } => {
                Self::Configuration(err.to_string())
            },
            ClientError::Status { status, .. } => match *status {
                StatusCode::NOT_FOUND => Self::NotFound(msg),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::PermissionDenied(msg),
                StatusCode::TOO_MANY_REQUESTS => Self::ResourceExhausted(msg),
                s if s.is_server_error() => Self::Unavailable(msg),
                _ => Self::Api(msg),
            },
            ClientError::Transport(e) if e.is_timeout() => Self::DeadlineExceeded(msg),
            ClientError::Transport(_) => Self::Unavailable(msg),
            ClientError::Decode(_) => Self::Api(msg),
        }
    }
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(msg) => tonic::Status::not_found(msg),
            ProviderError::Validation(msg) => tonic::Status::invalid_argument(msg),
            ProviderError::Configuration(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::UnknownResource(msg) => tonic::Status::not_found(msg),
            ProviderError::Serialization(err) => {
                tonic::Status::invalid_argument(format!("Serialization error: {}", err))
            },
            ProviderError::PermissionDenied(msg) => tonic::Status::permission_denied(msg),
            ProviderError::ResourceExhausted(msg) => tonic::Status::resource_exhausted(msg),
            ProviderError::Unavailable(msg) => tonic::Status::unavailable(msg),
            ProviderError::DeadlineExceeded(msg) => tonic::Status::deadline_exceeded(msg),
            ProviderError::Api(msg) => tonic::Status::internal(msg),
        }
    }
}
