//! Alerts command.

use chrono::Utc;
use clap::Args;

use crate::store::Store;

/// Show current travel alerts
#[derive(Debug, Args)]
pub struct AlertsCommand {
    /// Include inactive and expired alerts
    #[arg(long)]
    all: bool,
}

impl AlertsCommand {
    pub async fn run(&self, store: &Store) -> Result<(), Box<dyn std::error::Error>> {
        let alerts = if self.all {
            store.alerts().list().await?
        } else {
            store.alerts().current(Utc::now()).await?
        };

        if alerts.is_empty() {
            println!("No alerts.");
            return Ok(());
        }

        for alert in alerts {
            println!("{}", alert);
            if let Some(body) = &alert.body {
                println!("  {}", body);
            }
            if let Some(expires) = alert.expires_at {
                println!("  expires {}", expires.format("%Y-%m-%d %H:%M UTC"));
            }
        }
        Ok(())
    }
}
