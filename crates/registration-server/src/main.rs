//! Registration service - Entry point.

use clap::Parser;
use registration_server::{
    cli::{self, Cli, Command},
    config::Config,
};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config);

    let result = match args.command {
        Command::InitDb => cli::init_db(&config).await.map(|_| ()),
        Command::Serve { host, port } => {
            info!(environment = ?config.app.environment, "Starting registration service");
            cli::serve(&config, host, port).await
        }
        Command::CheckCpf { cpf } => {
            return if cli::check_cpf(&cpf) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Human-readable logs in development, JSON lines in production.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
