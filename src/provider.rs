//! The alwaysdata provider.
//!
//! Implements the provider lifecycle on top of the API client: the host
//! configures it once with an endpoint and API key, then reads data sources.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::client::Alwaysdata;
use crate::config::{provider_config_schema, ProviderConfig, API_KEY_ENV_VAR};
use crate::data_source::DatabaseDataSource;
use crate::error::ProviderError;
use crate::schema::{has_errors, Diagnostic, ProviderSchema};
use crate::server::ProviderService;
use crate::types::PROVIDER_TYPE_NAME;
use crate::validation::validate;

/// The alwaysdata provider.
pub struct AlwaysdataProvider {
    /// Set to the crate version on release, `"test"` when running tests.
    version: String,
    /// Overrides the `AD_API_KEY` lookup; used by tests.
    env_api_key: Option<Option<String>>,
    client: RwLock<Option<Arc<Alwaysdata>>>,
}

impl AlwaysdataProvider {
    /// Create an unconfigured provider.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            env_api_key: None,
            client: RwLock::new(None),
        }
    }

    /// Use `api_key` instead of the `AD_API_KEY` environment variable as the
    /// fallback when the configuration carries no `apikey`.
    pub fn with_env_api_key(mut self, api_key: Option<String>) -> Self {
        self.env_api_key = Some(api_key);
        self
    }

    /// Provider version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether `configure` has succeeded.
    pub async fn is_configured(&self) -> bool {
        self.client.read().await.is_some()
    }

    fn resolve_config(&self, config: &Value) -> Result<ProviderConfig, Vec<Diagnostic>> {
        match &self.env_api_key {
            Some(fallback) => ProviderConfig::resolve(config, fallback.clone()),
            None => ProviderConfig::from_env(config),
        }
    }

    async fn configured_client(&self) -> Result<Arc<Alwaysdata>, ProviderError> {
        self.client.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration("provider has not been configured".to_string())
        })
    }
}

#[async_trait::async_trait]
impl ProviderService for AlwaysdataProvider {
    fn type_name(&self) -> &str {
        PROVIDER_TYPE_NAME
    }

    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(provider_config_schema())
            .with_data_source(DatabaseDataSource::type_name(), DatabaseDataSource::schema())
    }

    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&provider_config_schema(), &config))
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let diagnostics = validate(&provider_config_schema(), &config);
        if has_errors(&diagnostics) {
            return Ok(diagnostics);
        }

        let resolved = match self.resolve_config(&config) {
            Ok(resolved) => resolved,
            Err(diagnostics) => return Ok(diagnostics),
        };
        if config.get("apikey").map_or(true, Value::is_null) {
            debug!(env = API_KEY_ENV_VAR, "using API key from the environment");
        }

        let client = Alwaysdata::new(resolved.client_options())
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;
        info!(
            endpoint = %client.endpoint(),
            version = %self.version,
            "alwaysdata provider configured"
        );
        *self.client.write().await = Some(Arc::new(client));

        Ok(diagnostics)
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        self.client.write().await.take();
        Ok(())
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        if data_source_type == DatabaseDataSource::type_name() {
            Ok(DatabaseDataSource::validate(&config))
        } else {
            Err(ProviderError::UnknownResource(data_source_type.to_string()))
        }
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        if data_source_type != DatabaseDataSource::type_name() {
            return Err(ProviderError::UnknownResource(data_source_type.to_string()));
        }
        let client = self.configured_client().await?;
        DatabaseDataSource::read(&client, &config).await
    }
}
