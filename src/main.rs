//! Demo service for the request logger.
//!
//! ```text
//! reqlog-demo --config reqlog.toml
//! reqlog-demo --service example --json --bind 127.0.0.1:3001
//! ```
//!
//! Routes:
//! - `GET /`      logs from inside the handler and returns 200
//! - `GET /fail`  returns an application error (recorded, 500)
//! - `GET /throw` panics (recovered, 500)
//! - anything else falls through to 404

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reqlog::config::{load_config, validate_config, AppConfig, ConfigError};
use reqlog::{request_logging, Field, Logger, RequestEntry, UnhandledError};

#[derive(Parser)]
#[command(name = "reqlog-demo")]
#[command(about = "Example service wired with the request logging middleware", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the service name.
    #[arg(short, long)]
    service: Option<String>,

    /// Render records as JSON.
    #[arg(long)]
    json: bool,

    /// Concise request lines without tags.
    #[arg(long)]
    concise: bool,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => {
                let mut config = AppConfig::default();
                config.logger.service = "reqlog-demo".to_string();
                config
            }
        };
        if let Some(bind) = self.bind {
            config.server.bind_address = bind;
        }
        if let Some(service) = self.service {
            config.logger.service = service;
        }
        if self.json {
            config.logger.json = Some(true);
        }
        if self.concise {
            config.logger.concise = Some(true);
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    // Diagnostics of the crate itself go through tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "reqlog=info,reqlog_demo=info".into());
    if config.logger.is_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let logger = Logger::new(config.logger.clone())?;
    let app = build_router(logger.clone(), config.server.request_timeout_secs);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let local_addr = listener.local_addr()?;
    logger.info(
        "listening",
        vec![Field::from(json!({ "address": local_addr.to_string() }))],
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    logger.info("shutdown complete", vec![]);
    Ok(())
}

#[allow(deprecated)]
fn build_router(logger: Logger, timeout_secs: u64) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/fail", get(fail))
        .route("/throw", get(throw))
        .layer(TimeoutLayer::new(Duration::from_secs(timeout_secs)))
        .layer(middleware::from_fn_with_state(logger, request_logging))
}

async fn index(entry: RequestEntry) -> (StatusCode, &'static str) {
    entry.info(
        "logging some action from within the handler",
        vec![Field::from(json!({ "details": 123 }))],
    );
    (StatusCode::OK, "welcome")
}

async fn fail() -> Result<&'static str, UnhandledError> {
    let err = std::io::Error::new(std::io::ErrorKind::NotFound, "fixture file missing");
    Err(err.into())
}

async fn throw() -> &'static str {
    panic!("oh no")
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
