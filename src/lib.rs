//! Dashmetrics Gateway Library
//!
//! REST gateway over three crypto data providers.
//!
//! # Features
//!
//! - **Pool / market data**: trending pools, OHLCV candles, pool and token lookup
//! - **Launch analytics**: holders, trades, volumes and creators of pump.fun tokens
//! - **Token metrics**: grades, prices, signals, sentiment and an AI agent
//! - **One transport**: every upstream call is a single attempt with one error-mapping rule
//! - **Uniform envelopes**: `{success, data}` on success, `{success: false, error}` otherwise

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod params;
pub mod provider;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cli::LogFormat;

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => subscriber.with(fmt::layer().json()).try_init(),
        LogFormat::Text => subscriber.with(fmt::layer()).try_init(),
    };
    installed.map_err(|e| Error::Internal(format!("Failed to install subscriber: {e}")))
}
