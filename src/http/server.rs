//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap application routes with the journal middleware in a fixed order
//! - Bind server to listener with peer address information
//! - Serve until the shutdown signal fires

use axum::{middleware, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::{LoggingConfig, ServiceConfig};
use crate::http::middleware::{lifecycle_logger, recovery, JournalSettings};

/// Apply the journal middleware to `routes`.
///
/// The lifecycle logger is always the outermost layer: it owns the
/// request context that recovery and handlers write into.
pub fn instrument(routes: Router, config: &LoggingConfig) -> Router {
    routes
        .layer(middleware::from_fn(recovery))
        .layer(middleware::from_fn_with_state(
            JournalSettings::from(config),
            lifecycle_logger,
        ))
}

/// HTTP server for an instrumented application.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `routes` under the journal middleware.
    pub fn new(config: ServiceConfig, routes: Router) -> Self {
        let router = instrument(routes, &config.logging);
        Self { router, config }
    }

    /// The instrumented router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
