//! Provider configuration.
//!
//! The host passes the `provider "alwaysdata" { ... }` block as JSON. The API
//! key may be left out of it and supplied through the `AD_API_KEY` environment
//! variable instead.

use std::fmt;

use serde_json::Value;

use crate::client::{check_api_key, check_endpoint, ClientOptions, DEFAULT_ENDPOINT};
use crate::schema::{Attribute, Diagnostic, Schema};

/// Environment variable holding the API key when `apikey` is not configured.
pub const API_KEY_ENV_VAR: &str = "AD_API_KEY";

/// Schema of the provider configuration block.
pub fn provider_config_schema() -> Schema {
    Schema::v0()
        .with_attribute(
            "endpoint",
            Attribute::optional_string().with_description(format!(
                "The alwaysdata API endpoint (default: {})",
                DEFAULT_ENDPOINT
            )),
        )
        .with_attribute(
            "apikey",
            Attribute::optional_string()
                .with_description(format!(
                    "The alwaysdata API key (you should set env var {})",
                    API_KEY_ENV_VAR
                ))
                .sensitive(),
        )
}

/// Resolved provider configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API endpoint.
    pub endpoint: String,
    api_key: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve the configuration, reading the API key fallback from the environment.
    pub fn from_env(config: &Value) -> Result<Self, Vec<Diagnostic>> {
        Self::resolve(config, std::env::var(API_KEY_ENV_VAR).ok())
    }

    /// Resolve the configuration against an explicit API key fallback.
    ///
    /// Attribute types are expected to have been validated against
    /// [`provider_config_schema`] already; values of the wrong type are
    /// treated as unset.
    pub fn resolve(config: &Value, env_api_key: Option<String>) -> Result<Self, Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();

        let endpoint = match config.get("endpoint").and_then(Value::as_str) {
            None => DEFAULT_ENDPOINT.to_string(),
            Some(raw) => match check_endpoint(raw) {
                Ok(()) => raw.to_string(),
                Err(err) => {
                    diagnostics.push(
                        Diagnostic::error("Invalid alwaysdata service endpoint")
                            .with_detail(format!(
                                "The provider cannot create the alwaysdata API client: {}.",
                                err
                            ))
                            .with_attribute("endpoint"),
                    );
                    String::new()
                },
            },
        };

        let api_key = match config.get("apikey").and_then(Value::as_str) {
            Some(key) => key.to_string(),
            None => env_api_key.unwrap_or_default(),
        };
        if let Err(err) = check_api_key(&api_key) {
            diagnostics.push(
                Diagnostic::error(err.to_string())
                    .with_detail(
                        "The provider cannot create the alwaysdata API client as there is an \
                         unknown or empty configuration value for the alwaysdata API key.",
                    )
                    .with_attribute("apikey"),
            );
        }

        if diagnostics.is_empty() {
            Ok(Self { endpoint, api_key })
        } else {
            Err(diagnostics)
        }
    }

    /// Options for the API client.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions::new(self.api_key.clone()).with_endpoint(self.endpoint.clone())
    }
}
