use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use onboard::cli;
use onboard::config::AppConfig;
use onboard::server::{self, ServerDb};

/// Onboard — configurable multi-step onboarding flow.
#[derive(Parser)]
#[command(name = "onboard")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST backend.
    Serve {
        /// Listen port (overrides ONBOARD_PORT).
        #[arg(long)]
        port: Option<u16>,

        /// Database file path (overrides ONBOARD_DB_PATH).
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Walk through the onboarding wizard.
    Wizard,

    /// Configure which components appear on pages 2 and 3.
    Admin,

    /// Show the user data table.
    Report,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;

    match cli.command {
        Commands::Serve { port, db } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(db) = db {
                config.db_path = db;
            }
            let db = Arc::new(ServerDb::new_local(&config.db_path).await?);
            eprintln!("🚀 Onboard API v{}", env!("CARGO_PKG_VERSION"));
            eprintln!("   http://0.0.0.0:{}/api", config.port);
            server::serve(db, config.port).await?;
        }
        Commands::Wizard => cli::run_wizard(&config).await?,
        Commands::Admin => cli::run_admin(&config).await?,
        Commands::Report => cli::run_report(&config).await?,
    }

    Ok(())
}
