//! Dashmetrics gateway binary

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use dashmetrics_gateway::{
    cli::{Cli, Command},
    config::Config,
    gateway::Gateway,
    provider::{LaunchClient, MetricsClient, PoolClient},
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Some(Command::CheckConfig) => check_config(&cli),
        Some(Command::Serve) | None => run_server(&cli).await,
    }
}

fn load_config(cli: &Cli) -> Option<Config> {
    match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            if let Some(host) = &cli.host {
                config.server.host.clone_from(host);
            }
            Some(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            None
        }
    }
}

/// Validate configuration and credentials without serving
fn check_config(cli: &Cli) -> ExitCode {
    let Some(config) = load_config(cli) else {
        return ExitCode::FAILURE;
    };

    let providers = &config.providers;
    let checks = [
        ("pools", PoolClient::from_config(&providers.pools).err()),
        ("launch", LaunchClient::from_config(&providers.launch).err()),
        ("metrics", MetricsClient::from_config(&providers.metrics).err()),
    ];

    let mut ok = true;
    for (name, failure) in checks {
        match failure {
            None => println!("✅ {name}"),
            Some(e) => {
                ok = false;
                println!("❌ {name}: {e}");
            }
        }
    }

    match serde_yaml::to_string(&config.redacted()) {
        Ok(yaml) => println!("\n{yaml}"),
        Err(e) => {
            eprintln!("❌ Failed to render configuration: {e}");
            return ExitCode::FAILURE;
        }
    }

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

async fn run_server(cli: &Cli) -> ExitCode {
    let Some(config) = load_config(cli) else {
        return ExitCode::FAILURE;
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting Dashmetrics gateway"
    );

    let gateway = match Gateway::new(config) {
        Ok(g) => g,
        Err(e) => {
            error!("Failed to create gateway: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = gateway.run().await {
        error!("Gateway error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Gateway shutdown complete");
    ExitCode::SUCCESS
}
