//! Hemmer provider for alwaysdata
//!
//! This crate implements a Hemmer provider exposing the alwaysdata hosting
//! API. It currently ships one data source, `alwaysdata_database`, which reads
//! a database by identifier.
//!
//! # Configuration
//!
//! ```hcl
//! provider "alwaysdata" {
//!   endpoint = "https://api.alwaysdata.com" # optional
//!   apikey   = "..."                        # optional, falls back to AD_API_KEY
//! }
//!
//! data "alwaysdata_database" "shop" {
//!   id = 42
//! }
//! ```
//!
//! # Handshake Protocol
//!
//! When the provider starts via [`serve`], it outputs a handshake string to stdout:
//!
//! ```text
//! HEMMER_PROVIDER|1|127.0.0.1:50051
//! ```
//!
//! Format: `HEMMER_PROVIDER|<protocol_version>|<address>`
//!
//! Hemmer spawns the provider as a subprocess, reads that line and connects
//! via gRPC. Resource operations of the protocol are answered with an
//! "Unknown resource type" diagnostic; the provider manages no resources.
//!
//! # Embedding
//!
//! ```ignore
//! use hemmer_provider_alwaysdata::{init_logging, serve, AlwaysdataProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hemmer_provider_alwaysdata::ServeError> {
//!     init_logging("info");
//!     serve(AlwaysdataProvider::new(env!("CARGO_PKG_VERSION"))).await
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod client;
pub mod config;
pub mod data_source;
pub mod error;
pub mod logging;
pub mod provider;
pub mod schema;
pub mod server;
pub mod testing;
pub mod types;
pub mod validation;

/// Types generated from `proto/provider.proto`.
#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated {
    tonic::include_proto!("hemmer.provider.v1");
}

// Re-export main types at crate root
pub use client::{Alwaysdata, ClientOptions, DEFAULT_ENDPOINT};
pub use config::{ProviderConfig, API_KEY_ENV_VAR};
pub use data_source::{DatabaseDataSource, DatabaseModel};
pub use error::{ClientError, ProviderError};
pub use logging::{init_logging, try_init_logging};
pub use provider::AlwaysdataProvider;
pub use schema::ProviderSchema;
pub use server::{
    serve, serve_on, serve_on_with_options, serve_with_options, serve_with_shutdown,
    ProviderService, ServeError, ServeOptions,
};
pub use types::{
    handshake_line, ProviderMetadata, ServerCapabilities, HANDSHAKE_PREFIX, PROTOCOL_VERSION,
    PROVIDER_TYPE_NAME,
};
pub use validation::{is_valid, validate};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
