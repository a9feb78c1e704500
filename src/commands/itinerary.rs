//! Itinerary commands: the day plan, plus "what's happening now" and
//! "what's next" views.

use clap::{Args, Subcommand};
use chrono::Local;

use crate::resolve;
use crate::store::Store;

/// Show the trip itinerary
#[derive(Debug, Args)]
pub struct ItineraryCommand {
    #[command(subcommand)]
    command: Option<ItinerarySubcommand>,

    /// Show a single trip day
    #[arg(long, short)]
    day: Option<i64>,
}

#[derive(Debug, Subcommand)]
enum ItinerarySubcommand {
    /// What is happening right now
    Now,
    /// The next thing on the plan
    Next,
}

impl ItineraryCommand {
    pub async fn run(&self, store: &Store) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            Some(ItinerarySubcommand::Now) => self.now(store).await,
            Some(ItinerarySubcommand::Next) => self.next(store).await,
            None => self.list(store).await,
        }
    }

    async fn list(&self, store: &Store) -> Result<(), Box<dyn std::error::Error>> {
        let items = match self.day {
            Some(day) => store.schedule().list_day(day).await?,
            None => store.schedule().list_all().await?,
        };

        if items.is_empty() {
            match self.day {
                Some(day) => println!("No schedule for day {}.", day),
                None => println!("No schedule loaded. Run 'tripdeck sync' or 'tripdeck seed load'."),
            }
            return Ok(());
        }

        let mut last_day = None;
        for item in &items {
            if last_day != Some(item.day_number) {
                if last_day.is_some() {
                    println!();
                }
                println!("Day {} - {}", item.day_number, item.date.format("%A, %B %-d"));
                last_day = Some(item.day_number);
            }
            println!("  {}", item);
            if let Some(segment) = store.schedule().transit_for(&item.id).await? {
                println!("    ↳ {}", segment);
            }
        }

        Ok(())
    }

    async fn now(&self, store: &Store) -> Result<(), Box<dyn std::error::Error>> {
        let now = Local::now().naive_local();
        let items = store.schedule().list_date(now.date()).await?;

        match resolve::current_item(&items, now) {
            Some(item) => {
                println!("Now: {}", item);
                if let Some(notes) = &item.notes {
                    println!("  {}", notes);
                }
            }
            None => println!("Nothing scheduled right now."),
        }
        Ok(())
    }

    async fn next(&self, store: &Store) -> Result<(), Box<dyn std::error::Error>> {
        let now = Local::now().naive_local();
        let items = store.schedule().list_all().await?;

        match resolve::next_item(&items, now) {
            Some(item) => {
                println!("Next: {} on {}", item, item.date.format("%A, %B %-d"));
                if let Some(segment) = store.schedule().transit_for(&item.id).await? {
                    println!("  ↳ {}", segment);
                }
            }
            None => println!("No schedule loaded."),
        }
        Ok(())
    }
}
