//! Seed commands: load a fixture file into the store, or wipe it.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::store::{SeedData, Store};

/// Load or reset local trip data
#[derive(Debug, Args)]
pub struct SeedCommand {
    #[command(subcommand)]
    command: SeedSubcommand,
}

#[derive(Debug, Subcommand)]
enum SeedSubcommand {
    /// Load a JSON seed file, replacing current data
    Load { file: PathBuf },
    /// Delete all local data
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

impl SeedCommand {
    pub async fn run(&self, store: &Store) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SeedSubcommand::Load { file } => {
                let seed = SeedData::from_file(file)?;
                store.apply_seed(&seed).await?;
                println!("✓ loaded {}", file.display());
                for (table, count) in store.table_counts().await? {
                    println!("  {:<16} {}", table.name(), count);
                }
                Ok(())
            }
            SeedSubcommand::Reset { yes } => {
                if !yes {
                    println!("This deletes all local trip data. Re-run with --yes to confirm.");
                    return Ok(());
                }
                store.clear_all().await?;
                println!("✓ local data cleared");
                Ok(())
            }
        }
    }
}
