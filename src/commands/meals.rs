//! Meal planning command: resolved slots plus restaurant suggestions.

use chrono::Local;
use clap::Args;

use crate::resolve;
use crate::store::Store;

/// Show meal slots and dining options for a day
#[derive(Debug, Args)]
pub struct MealsCommand {
    /// Trip day number (defaults to today)
    #[arg(long, short)]
    day: Option<i64>,
}

impl MealsCommand {
    pub async fn run(&self, store: &Store) -> Result<(), Box<dyn std::error::Error>> {
        let day = match self.day {
            Some(day) => day,
            None => {
                let today = Local::now().date_naive();
                match super::day_for_date(store, today).await? {
                    Some(day) => day,
                    None => {
                        println!("Today is not a trip day. Use --day to pick one.");
                        return Ok(());
                    }
                }
            }
        };

        let items = store.schedule().list_day(day).await?;
        let overrides = store.responses().overrides_for_day(day).await?;
        let slots = resolve::resolve_meal_slots(&items, &overrides, day);

        println!("Meals for day {}", day);
        println!();
        for slot in &slots {
            println!("{} at {}", slot.meal, slot.time.format("%H:%M"));
            if let Some(reason) = &slot.reason {
                println!("  {}", reason);
            }
            if !slot.show_options {
                continue;
            }
            let options = store.dining().for_slot(day, slot.meal).await?;
            if options.is_empty() {
                println!("  No saved options.");
            }
            for option in options {
                println!("  - {}", option);
            }
        }

        Ok(())
    }
}
