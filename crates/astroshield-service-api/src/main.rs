//! Local HTTP server for the AstroShield API.
//!
//! # Configuration
//!
//! Every flag falls back to an environment variable:
//!
//! - `--port` / `SERVICE_PORT` - HTTP port (default: 8080)
//! - `--base-path` / `ASTROSHIELD_BASE_PATH` - prefix stripped from request paths
//! - `--lifespan` / `ASTROSHIELD_LIFESPAN` - `off` (default) or `on`
//! - `--expose-internal-errors` / `ASTROSHIELD_EXPOSE_INTERNAL_ERRORS`
//! - `--log-format` / `LOG_FORMAT` - `json` (default) or `text`
//! - `RUST_LOG` - log level (default: info)

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use astroshield_lambda_shared::{
    init_logging, AdapterConfig, EventAdapter, Lifespan, LogFormat, LoggingConfig,
};
use astroshield_lib::{Services, API_VERSION};
use astroshield_service_api::app;

#[derive(Parser, Debug)]
#[command(author, version, about = "Local HTTP server for the AstroShield API")]
struct Args {
    /// HTTP port to listen on.
    #[arg(long, env = "SERVICE_PORT", default_value_t = 8080)]
    port: u16,

    /// Prefix stripped from every request path (e.g. `/prod`).
    #[arg(long, env = "ASTROSHIELD_BASE_PATH")]
    base_path: Option<String>,

    /// Run provider startup and shutdown hooks.
    #[arg(long, env = "ASTROSHIELD_LIFESPAN", default_value_t = Lifespan::Off)]
    lifespan: Lifespan,

    /// Return raw internal error messages to clients.
    #[arg(long, env = "ASTROSHIELD_EXPOSE_INTERNAL_ERRORS")]
    expose_internal_errors: bool,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", default_value = "json")]
    log_format: LogFormat,
}

impl Args {
    fn adapter_config(&self) -> AdapterConfig {
        let config = AdapterConfig::default()
            .with_lifespan(self.lifespan)
            .with_expose_internal_errors(self.expose_internal_errors);
        match &self.base_path {
            Some(base_path) => config.with_base_path(base_path),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let logging_config = LoggingConfig::from_env().with_format(args.log_format);
    init_logging(&logging_config).context("failed to install tracing subscriber")?;

    let adapter = EventAdapter::new(Services::mock(), args.adapter_config());
    adapter
        .startup()
        .await
        .context("provider startup failed")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(
        addr = %addr,
        version = API_VERSION,
        base_path = adapter.config().base_path.as_deref().unwrap_or("-"),
        lifespan = %adapter.config().lifespan,
        "listening on"
    );

    axum::serve(listener, app(adapter.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    adapter.shutdown().await;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["astroshield-service-api"]).unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.lifespan, Lifespan::Off);
        assert!(!args.expose_internal_errors);
    }

    #[test]
    fn test_args_build_adapter_config() {
        let args = Args::try_parse_from([
            "astroshield-service-api",
            "--base-path",
            "prod",
            "--lifespan",
            "on",
            "--expose-internal-errors",
            "--log-format",
            "text",
        ])
        .unwrap();
        let config = args.adapter_config();

        assert_eq!(config.base_path.as_deref(), Some("/prod"));
        assert_eq!(config.lifespan, Lifespan::On);
        assert!(config.expose_internal_errors);
        assert_eq!(args.log_format, LogFormat::Text);
    }
}
