//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Dashmetrics gateway - REST access to pool, launch and token-metrics data
#[derive(Parser, Debug)]
#[command(name = "dashmetrics-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "DASHMETRICS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "DASHMETRICS_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "DASHMETRICS_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[arg(
        long,
        default_value = "info",
        env = "DASHMETRICS_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format
    #[arg(
        long,
        value_enum,
        default_value_t = LogFormat::Text,
        env = "DASHMETRICS_LOG_FORMAT",
        global = true
    )]
    pub log_format: LogFormat,

    /// Subcommand (optional - defaults to server mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start the gateway server (default)
    Serve,

    /// Load configuration, resolve credentials and print a redacted summary
    CheckConfig,
}
