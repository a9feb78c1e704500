//! Derived-view resolvers: pure, time-aware functions over store
//! snapshots. No I/O here; the live query layer feeds these from
//! repository reads and re-runs them when the underlying tables change.

mod current;
mod meals;
mod next;
mod stay;

pub use current::current_item;
pub use meals::{resolve_meal_slots, MealSlot};
pub use next::next_item;
pub use stay::{last_night, lodging_for_date, tonight};
