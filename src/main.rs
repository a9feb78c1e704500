use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod live;
mod models;
mod resolve;
mod store;
mod sync;

use commands::{
    AlertsCommand, AskCommand, ChecklistCommand, ConfigCommand, ItineraryCommand, MealsCommand,
    SeedCommand, StayCommand, SyncCommand, WatchCommand,
};
use config::Config;
use store::Store;
use sync::{SyncClient, SyncEngine};

#[derive(Parser)]
#[command(name = "tripdeck")]
#[command(version)]
#[command(about = "Offline-first itinerary companion", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the trip itinerary
    Itinerary(ItineraryCommand),

    /// Show meal slots and dining options
    Meals(MealsCommand),

    /// Show lodging for a day
    Stay(StayCommand),

    /// Show current travel alerts
    Alerts(AlertsCommand),

    /// Manage the trip checklist
    Checklist(ChecklistCommand),

    /// Ask a question, answered from cached responses
    Ask(AskCommand),

    /// Follow the itinerary live
    Watch(WatchCommand),

    /// Sync with the remote service
    Sync(SyncCommand),

    /// Load or reset local trip data
    Seed(SeedCommand),

    /// Show configuration
    Config(ConfigCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cli_config_path = cli.config.clone();
    let config = Config::load(cli.config)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(execute_command(&cli.command, &config, cli_config_path))
}

async fn execute_command(
    command: &Option<Commands>,
    config: &Config,
    cli_config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Config is the only command that works without a database.
    if let Some(Commands::Config(cmd)) = command {
        return cmd.run(config, cli_config_path);
    }

    let store = Store::open(config.database_path.clone()).await?;

    // Catch up quietly before read commands when auto-sync is on.
    if config.sync.auto_sync && is_read_command(command) {
        try_auto_sync(&store, config).await;
    }

    match command {
        Some(Commands::Itinerary(cmd)) => cmd.run(&store).await?,
        Some(Commands::Meals(cmd)) => cmd.run(&store).await?,
        Some(Commands::Stay(cmd)) => cmd.run(&store).await?,
        Some(Commands::Alerts(cmd)) => cmd.run(&store).await?,
        Some(Commands::Checklist(cmd)) => cmd.run(&store).await?,
        Some(Commands::Ask(cmd)) => cmd.run(&store).await?,
        Some(Commands::Watch(cmd)) => cmd.run(&store, config).await?,
        Some(Commands::Sync(cmd)) => cmd.run(&store, config).await?,
        Some(Commands::Seed(cmd)) => cmd.run(&store).await?,
        Some(Commands::Config(_)) => unreachable!(),
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

/// Best-effort catch-up download; never blocks the command on failure.
async fn try_auto_sync(store: &Store, config: &Config) {
    let client = match SyncClient::from_config(&config.sync) {
        Ok(client) => client,
        Err(_) => return,
    };
    let mut engine = SyncEngine::new(store.clone(), client);
    engine.download_if_stale().await;
}

/// Read commands show data that benefits from a fresh snapshot.
fn is_read_command(command: &Option<Commands>) -> bool {
    matches!(
        command,
        Some(
            Commands::Itinerary(_)
                | Commands::Meals(_)
                | Commands::Stay(_)
                | Commands::Alerts(_)
                | Commands::Checklist(_)
        )
    )
}
