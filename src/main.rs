use std::net::SocketAddr;

use clap::Parser;
use sonarr_provider::provider::SonarrProvider;
use sonarr_provider::{init_logging_with_default, serve, serve_on};

#[derive(Parser)]
#[command(name = "terraform-provider-sonarr")]
#[command(version)]
#[command(about = "Sonarr provider plugin", long_about = None)]
struct Cli {
    /// Log at debug level unless SONARR_PROVIDER_LOG or RUST_LOG says otherwise
    #[arg(long)]
    debug: bool,

    /// Listen on this address instead of an ephemeral port on 127.0.0.1
    #[arg(long)]
    address: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging_with_default(if cli.debug { "debug" } else { "info" });

    let provider = SonarrProvider::new(env!("CARGO_PKG_VERSION"));
    tracing::info!(version = provider.version(), "Starting Sonarr provider");

    match cli.address {
        Some(addr) => serve_on(provider, addr).await,
        None => serve(provider).await,
    }
}
