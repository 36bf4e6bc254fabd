//! Request journal demonstration service.
//!
//! Serves a handful of routes behind the journal middleware so the log
//! output can be observed end to end:
//! - `GET /health`: clean request, one `info` line
//! - `GET /orders`: handler panics, `500` plus two `error` lines
//! - `POST /orders/validate`: two recorded validation errors, `400`
//! - `GET /whoami`: records the caller from `x-user-id`

use axum::{
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use request_journal::lifecycle::signals::wait_for_shutdown;
use request_journal::lifecycle::startup::{initialize, StartupOptions};
use request_journal::{HttpServer, RequestContext, Shutdown};

#[derive(Parser)]
#[command(name = "request-journal")]
#[command(about = "Demonstration service for the request journal middleware", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

async fn health() -> &'static str {
    "ok"
}

async fn orders() -> StatusCode {
    panic!("order store unavailable");
}

async fn validate_order(ctx: RequestContext) -> StatusCode {
    ctx.push_error("quantity must be positive");
    ctx.push_error("sku is required");
    StatusCode::BAD_REQUEST
}

async fn whoami(ctx: RequestContext, headers: HeaderMap) -> String {
    let Some(user_id) = headers.get("x-user-id").and_then(|v| v.to_str().ok()) else {
        return "anonymous".to_string();
    };
    match user_id.parse::<i64>() {
        Ok(numeric) => ctx.set_user_id(numeric),
        Err(_) => ctx.set_user_id(user_id),
    }
    user_id.to_string()
}

fn routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/orders", get(orders))
        .route("/orders/validate", post(validate_order))
        .route("/whoami", get(whoami))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = initialize(&StartupOptions {
        config_path: cli.config,
        bind_address: cli.bind,
    })?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, routes());
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_shutdown().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
