//! CLI commands.

pub mod alerts;
pub mod ask;
pub mod checklist;
pub mod config_cmd;
pub mod itinerary;
pub mod meals;
pub mod seed_cmd;
pub mod stay;
pub mod sync_cmd;
pub mod watch;

pub use alerts::AlertsCommand;
pub use ask::AskCommand;
pub use checklist::ChecklistCommand;
pub use config_cmd::ConfigCommand;
pub use itinerary::ItineraryCommand;
pub use meals::MealsCommand;
pub use seed_cmd::SeedCommand;
pub use stay::StayCommand;
pub use sync_cmd::SyncCommand;
pub use watch::WatchCommand;

use crate::store::Store;
use chrono::NaiveDate;

/// Resolve a trip day number to its calendar date from the schedule.
pub(crate) async fn date_for_day(
    store: &Store,
    day_number: i64,
) -> Result<Option<NaiveDate>, sqlx::Error> {
    let items = store.schedule().list_day(day_number).await?;
    Ok(items.first().map(|item| item.date))
}

/// Find the trip day number for a calendar date from the schedule.
pub(crate) async fn day_for_date(
    store: &Store,
    date: NaiveDate,
) -> Result<Option<i64>, sqlx::Error> {
    let items = store.schedule().list_date(date).await?;
    Ok(items.first().map(|item| item.day_number))
}
