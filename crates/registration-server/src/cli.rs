//! Command-line interface.

use crate::api::{create_router_with_rate_limit, AppState, RateLimitState, RegistrationWindow};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use registration_store::{cpf, Initialization, RegistrationStore, Store};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "inscricoes",
    version,
    about = "Event registration service with CPF validation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the registration storage (no-op if it already exists)
    InitDb,

    /// Start the HTTP server
    Serve {
        /// Listen address (overrides SERVER__HOST)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides SERVER__PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate a CPF and print the result
    CheckCpf {
        /// CPF, with or without punctuation
        cpf: String,
    },
}

/// Storage backend selected by configuration.
pub fn store_from_config(config: &Config) -> Store {
    if config.storage.persist {
        Store::file(config.storage.path.clone())
    } else {
        info!("Persistence disabled, using in-memory storage");
        Store::memory()
    }
}

/// `init-db`: prepare empty storage.
pub async fn init_db(config: &Config) -> Result<Initialization> {
    let store = store_from_config(config);
    let outcome = RegistrationStore::initialize(&store)
        .await
        .with_context(|| format!("Failed to initialize storage at {}", store.describe()))?;

    match outcome {
        Initialization::Created => {
            info!(storage = %store.describe(), "Registration storage created")
        }
        Initialization::AlreadyInitialized => {
            info!(storage = %store.describe(), "Registration storage already initialized")
        }
    }

    Ok(outcome)
}

/// `serve`: initialize storage if needed, open it, and serve HTTP until the
/// process is stopped.
pub async fn serve(config: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let store = store_from_config(config);
    RegistrationStore::initialize(&store)
        .await
        .context("Failed to initialize storage")?;
    let registrations = RegistrationStore::open(store)
        .await
        .context("Failed to open registration storage")?;

    let window = RegistrationWindow::opening_on(config.registration.opens_on);
    info!(opens_on = %window.opens_on, "Registration window configured");

    let state = AppState::new(registrations, window);
    let rate_limit = RateLimitState::new(config.rate_limit.global_per_minute);
    let app = create_router_with_rate_limit(state, rate_limit);

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", host, port))?;
    let addr = listener.local_addr()?;

    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// `check-cpf`: returns whether the CPF is valid, printing the verdict.
pub fn check_cpf(input: &str) -> bool {
    match cpf::validate(input) {
        Ok(cpf) => {
            println!("{} is valid", cpf.formatted());
            true
        }
        Err(e) => {
            println!("{} is not a valid CPF: {}", input, e);
            false
        }
    }
}
