//! Config command: show the effective configuration.

use std::path::PathBuf;

use clap::Args;

use crate::config::Config;

/// Show configuration
#[derive(Debug, Args)]
pub struct ConfigCommand {}

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let path = config_path.unwrap_or_else(Config::default_config_path);

        println!("Config file: {}", path.display());
        println!("Database:    {}", config.database_path.display());
        println!();
        if config.sync.is_configured() {
            println!("Sync server: {}", config.sync.server_url.as_deref().unwrap_or(""));
            println!(
                "Auto-sync:   {}",
                if config.sync.auto_sync {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        } else {
            println!("Sync:        not configured");
        }
        Ok(())
    }
}
