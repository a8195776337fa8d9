use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weddmate::commands::{ConfigCommand, SyncCommand, WeddingCommand};
use weddmate::config::Config;
use weddmate::store::{Store, StoreHandle};

#[derive(Parser)]
#[command(name = "weddmate")]
#[command(version)]
#[command(about = "Keep a local copy of your WeddMate weddings", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull weddings from the API into the local store
    Sync(SyncCommand),

    /// Browse and manage stored weddings
    #[command(name = "weddings")]
    Weddings(WeddingCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weddmate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for init command
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Sync(cmd)) => {
            let store = open_store(&config).await;
            let result = cmd.run(&store, &config).await;
            store.shutdown().await?;
            result?;
        }
        Some(Commands::Weddings(cmd)) => {
            let store = open_store(&config).await;
            let result = cmd.run(&store).await;
            store.shutdown().await?;
            result?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config, cli_config_path)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

/// Opens the store or exits; nothing useful can run without it.
async fn open_store(config: &Config) -> StoreHandle {
    match Store::open(&config.database_path.value).await {
        Ok(store) => store,
        Err(e) => {
            error!(fatal = e.is_fatal(), "cannot open store: {}", e);
            std::process::exit(1);
        }
    }
}
