//! gRPC server and handshake.
//!
//! This module provides the `ProviderService` trait the provider implements,
//! and the `serve` functions that expose it over the Hemmer provider protocol.
//!
//! # Signal Handling
//!
//! The server handles OS signals (SIGTERM, SIGINT) for graceful shutdown.
//! When a signal is received, the server:
//! 1. Stops accepting new connections
//! 2. Waits for in-flight requests to complete (up to the shutdown timeout)
//! 3. Calls the provider's `stop()` method

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;
use tonic::transport::Server;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ProviderError;
use crate::generated;
use crate::schema::{has_errors, Diagnostic, DiagnosticSeverity, ProviderSchema, Schema};
use crate::types::{handshake_line, ProviderMetadata};

/// Error returned by the `serve` functions.
pub type ServeError = Box<dyn std::error::Error + Send + Sync>;

/// Operations a provider exposes to the host.
///
/// The protocol also carries resource operations; this provider manages no
/// resources, so the server answers those on its own.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    /// Provider type name, the prefix of every data source name.
    fn type_name(&self) -> &str;

    /// Return the provider's schema including all data sources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata. By default, this is derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let mut resources: Vec<String> = schema.resources.into_keys().collect();
        let mut data_sources: Vec<String> = schema.data_sources.into_keys().collect();
        resources.sort();
        data_sources.sort();
        ProviderMetadata {
            resources,
            data_sources,
            capabilities: Default::default(),
        }
    }

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Ok(vec![])
    }

    /// Configure the provider with credentials and settings.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (data_source_type, config);
        Ok(vec![])
    }

    /// Read data from the remote API.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError>;
}

/// Adapter between the generated gRPC trait and [`ProviderService`].
struct ProviderGrpcService<P: ProviderService> {
    provider: Arc<P>,
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<generated::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|d| generated::Diagnostic {
            severity: match d.severity {
                DiagnosticSeverity::Error => generated::diagnostic::Severity::Error as i32,
                DiagnosticSeverity::Warning => generated::diagnostic::Severity::Warning as i32,
            },
            summary: d.summary,
            detail: d.detail.unwrap_or_default(),
            attribute: d.attribute.unwrap_or_default(),
        })
        .collect()
}

fn error_to_diagnostics(err: ProviderError) -> Vec<generated::Diagnostic> {
    diagnostics_to_proto(vec![Diagnostic::error(err.to_string())])
}

fn unsupported_resource(resource_type: &str) -> Vec<generated::Diagnostic> {
    warn!(resource_type = %resource_type, "resource operation requested, provider manages no resources");
    error_to_diagnostics(ProviderError::UnknownResource(resource_type.to_string()))
}

fn schema_to_proto(schema: &Schema) -> generated::Schema {
    let mut names: Vec<&String> = schema.attributes.keys().collect();
    names.sort();

    generated::Schema {
        version: schema.version as i64,
        block: Some(generated::Block {
            attributes: names
                .into_iter()
                .map(|name| {
                    let attr = &schema.attributes[name];
                    generated::Attribute {
                        name: name.clone(),
                        r#type: serde_json::to_vec(&attr.attr_type).unwrap_or_default(),
                        required: attr.flags.required,
                        optional: attr.flags.optional,
                        computed: attr.flags.computed,
                        sensitive: attr.flags.sensitive,
                        description: attr.description.clone().unwrap_or_default(),
                        force_new: false,
                        default_value: vec![],
                    }
                })
                .collect(),
            block_types: vec![],
            description: schema.description.clone().unwrap_or_default(),
        }),
    }
}

/// Undecodable payloads are treated as null.
fn decode_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}

fn log_diagnostics(operation: &str, diagnostics: &[Diagnostic]) {
    if has_errors(diagnostics) {
        warn!(
            diagnostics = diagnostics.len(),
            "{} completed with errors", operation
        );
    } else {
        info!("{} completed successfully", operation);
    }
}

#[tonic::async_trait]
impl<P: ProviderService> generated::provider_server::Provider for ProviderGrpcService<P> {
    #[instrument(skip(self, _request), name = "grpc.get_metadata")]
    async fn get_metadata(
        &self,
        _request: tonic::Request<generated::GetMetadataRequest>,
    ) -> Result<tonic::Response<generated::GetMetadataResponse>, tonic::Status> {
        let metadata = self.provider.metadata();
        debug!(data_sources = metadata.data_sources.len(), "GetMetadata completed");
        Ok(tonic::Response::new(generated::GetMetadataResponse {
            server_capabilities: Some(generated::ServerCapabilities {
                plan_destroy: metadata.capabilities.plan_destroy,
            }),
            resources: metadata.resources,
            data_sources: metadata.data_sources,
            diagnostics: vec![],
        }))
    }

    #[instrument(skip(self, _request), name = "grpc.get_schema")]
    async fn get_schema(
        &self,
        _request: tonic::Request<generated::GetSchemaRequest>,
    ) -> Result<tonic::Response<generated::GetSchemaResponse>, tonic::Status> {
        let schema = self.provider.schema();
        debug!(data_sources = schema.data_sources.len(), "GetSchema completed");
        Ok(tonic::Response::new(generated::GetSchemaResponse {
            provider: Some(schema_to_proto(&schema.provider)),
            resources: schema
                .resources
                .iter()
                .map(|(k, v)| (k.clone(), schema_to_proto(v)))
                .collect(),
            data_sources: schema
                .data_sources
                .iter()
                .map(|(k, v)| (k.clone(), schema_to_proto(v)))
                .collect(),
            diagnostics: vec![],
        }))
    }

    #[instrument(skip(self, request), name = "grpc.validate_provider_config")]
    async fn validate_provider_config(
        &self,
        request: tonic::Request<generated::ValidateProviderConfigRequest>,
    ) -> Result<tonic::Response<generated::ValidateProviderConfigResponse>, tonic::Status> {
        let config = decode_json(&request.into_inner().config);

        let diagnostics = match self.provider.validate_provider_config(config).await {
            Ok(diagnostics) => {
                log_diagnostics("ValidateProviderConfig", &diagnostics);
                diagnostics_to_proto(diagnostics)
            },
            Err(e) => {
                error!(error = %e, "ValidateProviderConfig failed");
                error_to_diagnostics(e)
            },
        };
        Ok(tonic::Response::new(
            generated::ValidateProviderConfigResponse { diagnostics },
        ))
    }

    #[instrument(skip(self, request), name = "grpc.configure")]
    async fn configure(
        &self,
        request: tonic::Request<generated::ConfigureRequest>,
    ) -> Result<tonic::Response<generated::ConfigureResponse>, tonic::Status> {
        let config = decode_json(&request.into_inner().config);

        let diagnostics = match self.provider.configure(config).await {
            Ok(diagnostics) => {
                log_diagnostics("Configure", &diagnostics);
                diagnostics_to_proto(diagnostics)
            },
            Err(e) => {
                error!(error = %e, "Configure failed");
                error_to_diagnostics(e)
            },
        };
        Ok(tonic::Response::new(generated::ConfigureResponse {
            diagnostics,
        }))
    }

    #[instrument(skip(self, _request), name = "grpc.stop")]
    async fn stop(
        &self,
        _request: tonic::Request<generated::StopRequest>,
    ) -> Result<tonic::Response<generated::StopResponse>, tonic::Status> {
        info!("Stop called");
        let error = match self.provider.stop().await {
            Ok(()) => String::new(),
            Err(e) => {
                error!(error = %e, "Stop failed");
                e.to_string()
            },
        };
        Ok(tonic::Response::new(generated::StopResponse { error }))
    }

    #[instrument(skip(self, request), name = "grpc.validate_resource_config")]
    async fn validate_resource_config(
        &self,
        request: tonic::Request<generated::ValidateResourceConfigRequest>,
    ) -> Result<tonic::Response<generated::ValidateResourceConfigResponse>, tonic::Status> {
        let req = request.into_inner();
        Ok(tonic::Response::new(
            generated::ValidateResourceConfigResponse {
                diagnostics: unsupported_resource(&req.resource_type),
            },
        ))
    }

    #[instrument(skip(self, request), name = "grpc.upgrade_resource_state")]
    async fn upgrade_resource_state(
        &self,
        request: tonic::Request<generated::UpgradeResourceStateRequest>,
    ) -> Result<tonic::Response<generated::UpgradeResourceStateResponse>, tonic::Status> {
        let req = request.into_inner();
        Ok(tonic::Response::new(
            generated::UpgradeResourceStateResponse {
                upgraded_state: vec![],
                diagnostics: unsupported_resource(&req.resource_type),
            },
        ))
    }

    #[instrument(skip(self, request), name = "grpc.plan")]
    async fn plan(
        &self,
        request: tonic::Request<generated::PlanRequest>,
    ) -> Result<tonic::Response<generated::PlanResponse>, tonic::Status> {
        let req = request.into_inner();
        Ok(tonic::Response::new(generated::PlanResponse {
            planned_state: vec![],
            changes: vec![],
            requires_replace: false,
            diagnostics: unsupported_resource(&req.resource_type),
        }))
    }

    #[instrument(skip(self, request), name = "grpc.create")]
    async fn create(
        &self,
        request: tonic::Request<generated::CreateRequest>,
    ) -> Result<tonic::Response<generated::CreateResponse>, tonic::Status> {
        let req = request.into_inner();
        Ok(tonic::Response::new(generated::CreateResponse {
            state: vec![],
            diagnostics: unsupported_resource(&req.resource_type),
        }))
    }

    #[instrument(skip(self, request), name = "grpc.read")]
    async fn read(
        &self,
        request: tonic::Request<generated::ReadRequest>,
    ) -> Result<tonic::Response<generated::ReadResponse>, tonic::Status> {
        let req = request.into_inner();
        Ok(tonic::Response::new(generated::ReadResponse {
            state: vec![],
            diagnostics: unsupported_resource(&req.resource_type),
        }))
    }

    #[instrument(skip(self, request), name = "grpc.update")]
    async fn update(
        &self,
        request: tonic::Request<generated::UpdateRequest>,
    ) -> Result<tonic::Response<generated::UpdateResponse>, tonic::Status> {
        let req = request.into_inner();
        Ok(tonic::Response::new(generated::UpdateResponse {
            state: vec![],
            diagnostics: unsupported_resource(&req.resource_type),
        }))
    }

    #[instrument(skip(self, request), name = "grpc.delete")]
    async fn delete(
        &self,
        request: tonic::Request<generated::DeleteRequest>,
    ) -> Result<tonic::Response<generated::DeleteResponse>, tonic::Status> {
        let req = request.into_inner();
        Ok(tonic::Response::new(generated::DeleteResponse {
            diagnostics: unsupported_resource(&req.resource_type),
        }))
    }

    #[instrument(skip(self, request), name = "grpc.import_resource_state")]
    async fn import_resource_state(
        &self,
        request: tonic::Request<generated::ImportResourceStateRequest>,
    ) -> Result<tonic::Response<generated::ImportResourceStateResponse>, tonic::Status> {
        let req = request.into_inner();
        Ok(tonic::Response::new(
            generated::ImportResourceStateResponse {
                imported: vec![],
                diagnostics: unsupported_resource(&req.resource_type),
            },
        ))
    }

    #[instrument(skip(self, request), name = "grpc.validate_data_source_config")]
    async fn validate_data_source_config(
        &self,
        request: tonic::Request<generated::ValidateDataSourceConfigRequest>,
    ) -> Result<tonic::Response<generated::ValidateDataSourceConfigResponse>, tonic::Status>
    {
        let req = request.into_inner();
        debug!(data_source_type = %req.data_source_type, "ValidateDataSourceConfig called");
        let config = decode_json(&req.config);

        let diagnostics = match self
            .provider
            .validate_data_source_config(&req.data_source_type, config)
            .await
        {
            Ok(diagnostics) => {
                log_diagnostics("ValidateDataSourceConfig", &diagnostics);
                diagnostics_to_proto(diagnostics)
            },
            Err(e) => {
                error!(data_source_type = %req.data_source_type, error = %e, "ValidateDataSourceConfig failed");
                error_to_diagnostics(e)
            },
        };
        Ok(tonic::Response::new(
            generated::ValidateDataSourceConfigResponse { diagnostics },
        ))
    }

    #[instrument(skip(self, request), name = "grpc.read_data_source")]
    async fn read_data_source(
        &self,
        request: tonic::Request<generated::ReadDataSourceRequest>,
    ) -> Result<tonic::Response<generated::ReadDataSourceResponse>, tonic::Status> {
        let req = request.into_inner();
        debug!(data_source_type = %req.data_source_type, "ReadDataSource called");
        let config = decode_json(&req.config);

        match self
            .provider
            .read_data_source(&req.data_source_type, config)
            .await
        {
            Ok(state) => {
                info!(data_source_type = %req.data_source_type, "ReadDataSource completed successfully");
                Ok(tonic::Response::new(generated::ReadDataSourceResponse {
                    state: serde_json::to_vec(&state).unwrap_or_default(),
                    diagnostics: vec![],
                }))
            },
            Err(e) => {
                error!(data_source_type = %req.data_source_type, error = %e, "ReadDataSource failed");
                Ok(tonic::Response::new(generated::ReadDataSourceResponse {
                    state: vec![],
                    diagnostics: error_to_diagnostics(e),
                }))
            },
        }
    }
}

/// Options for configuring the provider server.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// How long in-flight requests may run after a shutdown signal.
    /// Default: 30 seconds.
    pub shutdown_timeout: Duration,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ServeOptions {
    /// Create new serve options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown timeout.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT, CTRL+C on Windows).
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
            _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
        }
    }

    #[cfg(windows)]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
        info!("Received CTRL+C, initiating graceful shutdown");
    }

    #[cfg(not(any(unix, windows)))]
    {
        std::future::pending::<()>().await;
    }
}

/// Serve a provider on an ephemeral loopback port.
///
/// Prints the handshake `HEMMER_PROVIDER|<version>|<address>` to stdout, then
/// serves until SIGTERM/SIGINT.
pub async fn serve<P: ProviderService>(provider: P) -> Result<(), ServeError> {
    serve_with_options(provider, ServeOptions::default()).await
}

/// Serve a provider on an ephemeral loopback port with custom options.
pub async fn serve_with_options<P: ProviderService>(
    provider: P,
    options: ServeOptions,
) -> Result<(), ServeError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    serve_with_shutdown(provider, listener, options, wait_for_shutdown_signal()).await
}

/// Serve a provider on a specific address.
pub async fn serve_on<P: ProviderService>(provider: P, addr: SocketAddr) -> Result<(), ServeError> {
    serve_on_with_options(provider, addr, ServeOptions::default()).await
}

/// Serve a provider on a specific address with custom options.
pub async fn serve_on_with_options<P: ProviderService>(
    provider: P,
    addr: SocketAddr,
    options: ServeOptions,
) -> Result<(), ServeError> {
    let listener = TcpListener::bind(addr).await?;
    serve_with_shutdown(provider, listener, options, wait_for_shutdown_signal()).await
}

/// Serve a provider on an already-bound listener until `signal` resolves.
pub async fn serve_with_shutdown<P, F>(
    provider: P,
    listener: TcpListener,
    options: ServeOptions,
    signal: F,
) -> Result<(), ServeError>
where
    P: ProviderService,
    F: Future<Output = ()> + Send,
{
    let addr = listener.local_addr()?;
    println!("{}", handshake_line(addr));
    info!(address = %addr, provider = provider.type_name(), "Provider server starting");

    let provider = Arc::new(provider);
    let grpc_service = ProviderGrpcService {
        provider: Arc::clone(&provider),
    };

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = Server::builder()
        .add_service(generated::provider_server::ProviderServer::new(grpc_service))
        .serve_with_incoming_shutdown(
            tokio_stream::wrappers::TcpListenerStream::new(listener),
            async {
                let _ = stop_rx.await;
            },
        );
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            if let Err(e) = result {
                error!(error = %e, "Server error");
                return Err(e.into());
            }
        }
        _ = signal => {
            let _ = stop_tx.send(());
            match tokio::time::timeout(options.shutdown_timeout, &mut server).await {
                Ok(Ok(())) => info!("Server shutdown complete"),
                Ok(Err(e)) => {
                    error!(error = %e, "Server error during shutdown");
                    return Err(e.into());
                }
                Err(_) => warn!(
                    timeout = ?options.shutdown_timeout,
                    "Shutdown timeout exceeded, forcing shutdown"
                ),
            }
        }
    }

    debug!("Calling provider stop()");
    if let Err(e) = provider.stop().await {
        warn!(error = %e, "Provider stop() returned error");
    }

    info!("Provider shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generated::provider_client::ProviderClient;
    use crate::provider::AlwaysdataProvider;
    use serde_json::json;
    use tonic::transport::Channel;

    struct Harness {
        client: ProviderClient<Channel>,
        stop: tokio::sync::oneshot::Sender<()>,
        handle: tokio::task::JoinHandle<Result<(), ServeError>>,
    }

    async fn start() -> Harness {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let provider = AlwaysdataProvider::new("test").with_env_api_key(None);
        let handle = tokio::spawn(serve_with_shutdown(
            provider,
            listener,
            ServeOptions::new().with_shutdown_timeout(Duration::from_secs(5)),
            async {
                let _ = stop_rx.await;
            },
        ));

        let client = ProviderClient::connect(format!("http://{}", addr))
            .await
            .unwrap();
        Harness {
            client,
            stop,
            handle,
        }
    }

    impl Harness {
        async fn shutdown(self) {
            drop(self.client);
            let _ = self.stop.send(());
            self.handle.await.unwrap().unwrap();
        }
    }

    #[test]
    fn test_schema_to_proto_sorts_attributes() {
        let schema = crate::data_source::DatabaseDataSource::schema();
        let proto = schema_to_proto(&schema);
        let block = proto.block.unwrap();
        let names: Vec<_> = block.attributes.iter().map(|a| a.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(block.description, "Database data source");

        let id = block.attributes.iter().find(|a| a.name == "id").unwrap();
        assert!(id.required);
        assert_eq!(id.r#type, b"\"int64\"".to_vec());
    }

    #[test]
    fn test_error_to_diagnostics() {
        let diags = error_to_diagnostics(ProviderError::NotFound("db 42".to_string()));
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].severity,
            generated::diagnostic::Severity::Error as i32
        );
        assert_eq!(diags[0].summary, "Resource not found: db 42");
    }

    #[test]
    fn test_decode_json_tolerates_garbage() {
        assert_eq!(decode_json(b""), Value::Null);
        assert_eq!(decode_json(b"{not json"), Value::Null);
        assert_eq!(decode_json(b"{\"id\":1}"), json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_metadata_and_schema_over_grpc() {
        let mut harness = start().await;

        let metadata = harness
            .client
            .get_metadata(generated::GetMetadataRequest {})
            .await
            .unwrap()
            .into_inner();
        assert_eq!(metadata.data_sources, vec!["alwaysdata_database"]);
        assert!(metadata.resources.is_empty());

        let schema = harness
            .client
            .get_schema(generated::GetSchemaRequest {})
            .await
            .unwrap()
            .into_inner();
        assert!(schema.data_sources.contains_key("alwaysdata_database"));
        let provider = schema.provider.unwrap().block.unwrap();
        let apikey = provider
            .attributes
            .iter()
            .find(|a| a.name == "apikey")
            .unwrap();
        assert!(apikey.sensitive);

        harness.shutdown().await;
    }

    #[tokio::test]
    async fn test_configure_errors_become_diagnostics() {
        let mut harness = start().await;

        let response = harness
            .client
            .configure(generated::ConfigureRequest {
                config: serde_json::to_vec(&json!({})).unwrap(),
            })
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].attribute, "apikey");

        let response = harness
            .client
            .read_data_source(generated::ReadDataSourceRequest {
                data_source_type: "alwaysdata_database".to_string(),
                config: serde_json::to_vec(&json!({"id": 1})).unwrap(),
            })
            .await
            .unwrap()
            .into_inner();
        assert!(response.state.is_empty());
        assert!(response.diagnostics[0]
            .summary
            .contains("provider has not been configured"));

        harness.shutdown().await;
    }

    #[tokio::test]
    async fn test_resource_operations_are_rejected() {
        let mut harness = start().await;

        let response = harness
            .client
            .plan(generated::PlanRequest {
                resource_type: "alwaysdata_database".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .into_inner();
        assert_eq!(
            response.diagnostics[0].summary,
            "Unknown resource type: alwaysdata_database"
        );

        let response = harness
            .client
            .delete(generated::DeleteRequest {
                resource_type: "alwaysdata_site".to_string(),
                current_state: vec![],
            })
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.diagnostics.len(), 1);

        harness.shutdown().await;
    }

    /// Tracks configure/stop so shutdown can be observed from outside the server.
    struct StopRecorder {
        configured: Arc<std::sync::atomic::AtomicBool>,
    }

    #[async_trait::async_trait]
    impl ProviderService for StopRecorder {
        fn type_name(&self) -> &str {
            "recorder"
        }

        fn schema(&self) -> ProviderSchema {
            ProviderSchema::new()
        }

        async fn configure(&self, _config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
            self.configured
                .store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(vec![])
        }

        async fn stop(&self) -> Result<(), ProviderError> {
            self.configured
                .store(false, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }

        async fn read_data_source(
            &self,
            data_source_type: &str,
            _config: Value,
        ) -> Result<Value, ProviderError> {
            Err(ProviderError::UnknownResource(data_source_type.to_string()))
        }
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_provider() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let configured = Arc::new(AtomicBool::new(false));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(serve_with_shutdown(
            StopRecorder {
                configured: Arc::clone(&configured),
            },
            listener,
            ServeOptions::new().with_shutdown_timeout(Duration::from_secs(5)),
            async {
                let _ = stop_rx.await;
            },
        ));

        let mut client = ProviderClient::connect(format!("http://{}", addr))
            .await
            .unwrap();
        client
            .configure(generated::ConfigureRequest {
                config: b"{}".to_vec(),
            })
            .await
            .unwrap();
        assert!(configured.load(Ordering::SeqCst));

        drop(client);
        stop.send(()).unwrap();
        handle.await.unwrap().unwrap();
        assert!(!configured.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_stop_over_grpc() {
        let mut harness = start().await;
        let response = harness
            .client
            .stop(generated::StopRequest {})
            .await
            .unwrap()
            .into_inner();
        assert!(response.error.is_empty());
        harness.shutdown().await;
    }
}
