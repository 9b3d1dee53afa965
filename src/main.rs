use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use hemmer_provider_alwaysdata::{
    init_logging, serve_on_with_options, serve_with_options, AlwaysdataProvider, ServeError,
    ServeOptions,
};
use tracing::info;

/// Hemmer provider for the alwaysdata API
#[derive(Parser, Debug)]
#[command(name = "hemmer-provider-alwaysdata", version, about, long_about = None)]
struct Args {
    /// Bind to this address instead of an ephemeral loopback port
    #[arg(long)]
    address: Option<SocketAddr>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, default_value_t = 30)]
    shutdown_timeout: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ServeError> {
    let args = Args::parse();
    init_logging(args.log_level.as_directive());

    let provider = AlwaysdataProvider::new(env!("CARGO_PKG_VERSION"));
    let options =
        ServeOptions::new().with_shutdown_timeout(Duration::from_secs(args.shutdown_timeout));
    info!(version = provider.version(), "starting alwaysdata provider");

    match args.address {
        Some(addr) => serve_on_with_options(provider, addr, options).await,
        None => serve_with_options(provider, options).await,
    }
}
