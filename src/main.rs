//! Local API Gateway
//!
//! A stand-in for a managed REST API gateway in front of a single backend
//! function, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                    LOCAL GATEWAY                      │
//!                    │                                                      │
//!  Client Request    │  ┌─────────┐   ┌──────────┐   ┌──────────────────┐   │
//!  ──────────────────┼─▶│  http   │──▶│ identity │──▶│ contract/routing │   │
//!                    │  │ server  │   │  (mock)  │   │  resolve + check │   │
//!                    │  └────┬────┘   └──────────┘   └────────┬─────────┘   │
//!                    │       │ OPTIONS                         ▼             │
//!                    │       ▼                         ┌──────────────────┐  │
//!                    │  ┌─────────┐                    │   integration    │  │
//!                    │  │  cors   │                    │ envelope/invoker │──┼──▶ Backend
//!                    │  └─────────┘                    └────────┬─────────┘  │    Function
//!  Client Response   │  ┌──────────┐                            ▼            │
//!  ◀─────────────────┼──│ response │◀───────────────── normalize reply ◀────┼───
//!                    │  └──────────┘                                         │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use local_gateway::config::{load_config, ConfigOverrides};
use local_gateway::observability::{logging, metrics};
use local_gateway::{ContractStore, GatewayServer, Shutdown};

#[derive(Parser)]
#[command(name = "local-gateway")]
#[command(about = "Local stand-in for a REST API gateway with proxy integration", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides listener.bind_address).
    #[arg(short, long)]
    bind: Option<String>,

    /// OpenAPI document path (overrides OPENAPI_FILE_PATH).
    #[arg(long)]
    contract: Option<String>,

    /// Backend function host (overrides LAMBDA_HOSTNAME).
    #[arg(long)]
    backend_host: Option<String>,

    /// Backend function port (overrides LAMBDA_PORT).
    #[arg(long)]
    backend_port: Option<u16>,

    /// Log level when RUST_LOG is not set.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        bind_address: cli.bind,
        contract_path: cli.contract,
        backend_hostname: cli.backend_host,
        backend_port: cli.backend_port,
        log_level: cli.log_level,
    };
    let config = load_config(cli.config.as_deref(), overrides)?;

    logging::init_logging(&config.observability)?;
    tracing::info!("local-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.invocation_url(),
        contract = %config.contract.path,
        timeout_ms = config.backend.timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let contract = ContractStore::load(&config.contract)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config, contract)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
