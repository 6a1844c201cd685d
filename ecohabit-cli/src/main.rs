//! ecohabit - Eco Habit Tracker API server
//!
//! Loads `.env`, reads configuration from the environment, connects the
//! database pool and serves the habit routes until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use ecohabit_server::Config;

mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "ecohabit",
    author,
    version,
    about = "REST API for tracking eco-friendly habits",
    long_about = "Serves GET/POST /habits and PUT/DELETE /habits/{id} over a PostgreSQL table. \
                  Database and listener settings come from DB_* and SERVICE_* environment \
                  variables (a .env file in the working directory is loaded first)."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Serve from an in-memory store instead of the database (nothing is persisted)
    #[arg(long)]
    memory: bool,

    /// Port to listen on (overrides SERVICE_PORT)
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    cors_permissive: bool,

    /// Disable per-client rate limiting
    #[arg(long)]
    no_rate_limit: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the environment config.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(port) = self.port {
            config.http.bind_addr.set_port(port);
        }
        if self.cors_permissive {
            config.http.cors_permissive = true;
        }
        if self.no_rate_limit {
            config.rate_limit = None;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    match dotenv {
        Ok(path) => info!("Loaded configuration from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }

    let config = cli.apply(Config::from_env().context("Invalid configuration")?);
    debug!(?config, "Resolved configuration");

    if cli.memory {
        ecohabit_server::serve_in_memory(config)
            .await
            .context("Server error")?;
    } else {
        ecohabit_server::serve(config).await.context("Server error")?;
    }

    Ok(())
}
