//! Sync commands: one-shot download and status.

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::store::{Store, Table};
use crate::sync::{DownloadOutcome, SyncClient, SyncEngine};

/// Sync with the remote service
#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,

    /// Download even if local data is fresh
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Subcommand)]
enum SyncSubcommand {
    /// Show sync configuration and per-table freshness
    Status,
}

impl SyncCommand {
    pub async fn run(
        &self,
        store: &Store,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            None => self.download(store, config).await,
            Some(SyncSubcommand::Status) => self.status(store, config).await,
        }
    }

    async fn download(
        &self,
        store: &Store,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let client = SyncClient::from_config(&config.sync)?;
        let mut engine = SyncEngine::new(store.clone(), client);

        if self.force {
            // Wipe the stamps so the staleness check cannot skip.
            for table in Table::SYNCABLE {
                store
                    .meta()
                    .set_last_synced(table, chrono::DateTime::UNIX_EPOCH)
                    .await?;
            }
        }

        println!("Syncing with server...");
        match engine.download_if_stale().await {
            DownloadOutcome::Completed { rows } => {
                println!("✓ downloaded {} rows", rows);
            }
            DownloadOutcome::Skipped => {
                println!("✓ already up to date");
            }
            DownloadOutcome::Failed(e) => {
                println!("✗ sync failed - {}", e);
                println!("Continuing on cached data.");
            }
        }
        Ok(())
    }

    async fn status(
        &self,
        store: &Store,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        println!("Sync Configuration");
        println!("==================");
        println!();

        if !config.sync.is_configured() {
            println!("Status: Not configured");
            println!();
            println!("To enable sync, add to your config file:");
            println!();
            println!("  sync:");
            println!("    server_url: \"https://sync.example.com\"");
            println!("    api_key: \"...\"");
            println!();
            println!("Or set environment variables:");
            println!("  TRIPDECK_SYNC_URL");
            println!("  TRIPDECK_SYNC_API_KEY");
            return Ok(());
        }

        println!("Server:    {}", config.sync.server_url.as_deref().unwrap_or(""));
        println!(
            "Auto-sync: {}",
            if config.sync.auto_sync {
                "enabled"
            } else {
                "disabled"
            }
        );
        println!();

        println!("Last synced:");
        for table in Table::SYNCABLE {
            match store.meta().last_synced(table).await? {
                Some(at) => println!("  ✓ {:<16} {}", table.name(), at.format("%Y-%m-%d %H:%M:%S UTC")),
                None => println!("  ✗ {:<16} never", table.name()),
            }
        }
        Ok(())
    }
}
