//! TLS-terminating relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                  TLS RELAY                    │
//!                    │                                               │
//!   Client (TLS)     │  ┌──────────┐   ┌─────────┐   ┌────────────┐  │
//!   ─────────────────┼─▶│   net    │──▶│  http   │──▶│  upstream  │──┼──▶ Backend
//!                    │  │ listener │   │ forward │   │ connection │  │    (plaintext)
//!                    │  │  + tls   │   │         │   │            │  │
//!                    │  └──────────┘   └─────────┘   └────────────┘  │
//!                    │                                               │
//!                    │  ┌─────────────────────────────────────────┐  │
//!                    │  │          Cross-Cutting Concerns          │  │
//!                    │  │  config · observability · lifecycle      │  │
//!                    │  └─────────────────────────────────────────┘  │
//!                    └───────────────────────────────────────────────┘
//! ```
//!
//! Startup is fail-fast: a bad config, an unusable certificate, or a bind
//! conflict terminates the process with a diagnostic. Per-session errors
//! never do.

use std::path::{Path, PathBuf};

use clap::Parser;

use tls_relay::config::loader::{self, Overrides};
use tls_relay::config::RelayConfig;
use tls_relay::error::StartupError;
use tls_relay::http::RelayServer;
use tls_relay::lifecycle::{signals, Shutdown};
use tls_relay::net::listener::{BindError, Listener};
use tls_relay::net::tls;
use tls_relay::observability;

#[derive(Parser, Debug)]
#[command(name = "tls-relay")]
#[command(about = "TLS-terminating relay that forwards to a plaintext backend", version)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address (host:port).
    #[arg(long)]
    bind: Option<String>,

    /// Override the upstream target (host:port).
    #[arg(long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let overrides = Overrides {
        bind_address: cli.bind,
        upstream: cli.upstream,
    };
    let config = match loader::load_config(cli.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    observability::logging::init(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tls-relay starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.authority(),
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    if let Err(err) = serve(config).await {
        match &err {
            StartupError::Bind(BindError::AddrInUse(addr)) => {
                tracing::error!(
                    address = %addr,
                    "Bind address is already in use; free the port or change listener.bind_address"
                );
            }
            _ => tracing::error!(error = %err, "Startup failed"),
        }
        std::process::exit(1);
    }
}

async fn serve(config: RelayConfig) -> Result<(), StartupError> {
    let listener = Listener::bind(&config.listener)?;

    let tls_config = match &config.listener.tls {
        Some(t) => {
            Some(tls::load_tls_config(Path::new(&t.cert_path), Path::new(&t.key_path)).await?)
        }
        None => None,
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let server = RelayServer::new(config)?;
    server.run(listener, tls_config, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
