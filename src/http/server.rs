//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all relay handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve TLS (or plaintext) on the bound listener
//! - Drain in-flight sessions on shutdown
//!
//! TLS handshakes run inside `axum-server`: a failed handshake drops that
//! connection without crashing the accept loop, and no HTTP response is
//! ever attempted for it.

use std::str::FromStr;
use std::time::Duration;

use axum::http::uri::Authority;
use axum::routing::any;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::http::forward::{relay_handler, RelayState};
use crate::http::request::RequestIdLayer;
use crate::net::listener::Listener;

/// The relay server: one independently scheduled task per connection,
/// all forwarding to a single fixed upstream.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
}

impl RelayServer {
    /// Create a new relay server with the given (validated) configuration.
    pub fn new(config: RelayConfig) -> Result<Self, axum::http::uri::InvalidUri> {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));

        // One upstream connection per inbound request: no idle pooling,
        // so a dropped client releases its upstream socket immediately.
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector);

        let upstream_authority = Authority::from_str(&config.upstream.authority())?;

        let state = RelayState {
            client,
            upstream_authority,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// `TimeoutLayer::new` answers a stuck upstream with 408; the
    /// deprecation nudges toward picking a custom status, which this
    /// relay has no reason to do.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: RelayState) -> Router {
        Router::new()
            .route("/{*path}", any(relay_handler))
            .route("/", any(relay_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on the bound listener until the shutdown signal fires, then
    /// drain in-flight sessions within the configured grace period.
    ///
    /// `tls` selects the production TLS path; `None` serves plaintext for
    /// tests and local runs.
    pub async fn run(
        self,
        listener: Listener,
        tls: Option<RustlsConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr();
        let scheme = if tls.is_some() { "https" } else { "http" };
        tracing::info!(
            address = %addr,
            scheme = scheme,
            upstream = %self.config.upstream.authority(),
            "Relay server starting"
        );

        let handle = Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let drain = handle.clone();
        tokio::spawn(async move {
            // A closed channel means the coordinator was dropped without
            // triggering; keep serving in that case.
            if shutdown.recv().await.is_ok() {
                tracing::info!("Draining in-flight sessions");
                drain.graceful_shutdown(Some(grace));
            }
        });

        let app = self.router.into_make_service();
        let std_listener = listener.into_std();
        match tls {
            Some(tls_config) => {
                axum_server::from_tcp_rustls(std_listener, tls_config)
                    .handle(handle)
                    .serve(app)
                    .await?
            }
            None => {
                axum_server::from_tcp(std_listener)
                    .handle(handle)
                    .serve(app)
                    .await?
            }
        }

        tracing::info!("Relay server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}
