//! Gateway server

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::router::{AppState, create_router};
use crate::config::{Config, ServerConfig};
use crate::provider::{LaunchClient, MetricsClient, PoolClient};
use crate::{Error, Result};

/// Dashmetrics gateway server
pub struct Gateway {
    config: Config,
    state: Arc<AppState>,
}

impl Gateway {
    /// Build every provider client from configuration.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error when a required credential is
    /// missing or a provider base URL is invalid.
    pub fn new(config: Config) -> Result<Self> {
        let providers = &config.providers;
        let state = Arc::new(AppState {
            pools: PoolClient::from_config(&providers.pools)?,
            launch: LaunchClient::from_config(&providers.launch)?,
            metrics: MetricsClient::from_config(&providers.metrics)?,
        });

        for (name, provider) in [
            ("pools", &providers.pools),
            ("launch", &providers.launch),
            ("metrics", &providers.metrics),
        ] {
            info!(provider = name, base_url = %provider.base_url, timeout = ?provider.timeout, "Provider ready");
        }

        Ok(Self { config, state })
    }

    /// Serve until Ctrl-C or SIGTERM
    pub async fn run(self) -> Result<()> {
        let addr = bind_addr(&self.config.server)?;
        let app = create_router(Arc::clone(&self.state), &self.config.server, &self.config.cors);

        let listener = TcpListener::bind(addr).await?;

        info!("============================================================");
        info!("DASHMETRICS GATEWAY v{}", env!("CARGO_PKG_VERSION"));
        info!("============================================================");
        info!(host = %self.config.server.host, port = %self.config.server.port, "Listening");
        info!("  /coins/*          pool and market data");
        info!("  /tools/*          token launch analytics");
        info!("  /token-metrics/*  grades, signals, sentiment, AI agent");
        info!("============================================================");

        let (stopping_tx, mut stopping_rx) = watch::channel(false);
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = stopping_tx.send(true);
            })
            .into_future();
        tokio::pin!(serve);

        let drain_timeout = self.config.server.shutdown_timeout;
        tokio::select! {
            result = &mut serve => {
                result.map_err(|e| Error::Internal(e.to_string()))?;
            }
            () = async {
                let _ = stopping_rx.changed().await;
                tokio::time::sleep(drain_timeout).await;
            } => {
                warn!(timeout = ?drain_timeout, "In-flight requests did not drain in time");
            }
        }

        info!("Gateway stopped");
        Ok(())
    }
}

fn bind_addr(server: &ServerConfig) -> Result<SocketAddr> {
    let ip = server
        .host
        .parse()
        .map_err(|e| Error::Config(format!("Invalid host '{}': {e}", server.host)))?;
    Ok(SocketAddr::new(ip, server.port))
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_parses_host() {
        let server = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 9000,
            ..ServerConfig::default()
        };
        assert_eq!(bind_addr(&server).unwrap().to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn bind_addr_rejects_hostname() {
        let server = ServerConfig {
            host: "not an ip".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(bind_addr(&server), Err(Error::Config(_))));
    }

    #[test]
    fn missing_metrics_key_fails_construction() {
        let mut config = Config::default();
        config.providers.metrics.api_key = None;
        let err = Gateway::new(config).err().unwrap();
        assert!(err.to_string().contains("TOKEN_METRICS_API_KEY"));
    }

    #[tokio::test]
    async fn literal_key_builds_gateway() {
        let mut config = Config::default();
        config.providers.metrics.api_key = Some("tm-literal".to_string());
        assert!(Gateway::new(config).is_ok());
    }
}
