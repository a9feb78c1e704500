//! Lodging command: where you sleep tonight and where you slept.

use chrono::Local;
use clap::Args;

use crate::resolve;
use crate::store::Store;

/// Show lodging for a day
#[derive(Debug, Args)]
pub struct StayCommand {
    /// Trip day number (defaults to today)
    #[arg(long, short)]
    day: Option<i64>,
}

impl StayCommand {
    pub async fn run(&self, store: &Store) -> Result<(), Box<dyn std::error::Error>> {
        let date = match self.day {
            Some(day) => match super::date_for_day(store, day).await? {
                Some(date) => date,
                None => {
                    println!("Day {} has no schedule; cannot resolve its date.", day);
                    return Ok(());
                }
            },
            None => Local::now().date_naive(),
        };

        let stays = store.lodging().list().await?;

        match resolve::tonight(&stays, date) {
            Some(stay) => {
                println!("Tonight: {}", stay.name);
                if let Some(address) = &stay.address {
                    println!("  {}", address);
                }
                if let Some(phone) = &stay.phone {
                    println!("  {}", phone);
                }
            }
            None => println!("No lodging for {}.", date),
        }

        if let Some(stay) = resolve::last_night(&stays, date) {
            println!("Last night: {}", stay.name);
        }

        Ok(())
    }
}
