mod alert;
mod cached_response;
mod checklist_item;
mod dining_option;
mod lodging;
mod meal;
mod schedule_item;
mod transit_segment;

pub use alert::Alert;
pub use cached_response::CachedResponse;
pub use checklist_item::ChecklistItem;
pub use dining_option::{AssignedMeal, DiningOption};
pub use lodging::Lodging;
pub use meal::{Meal, MealInclusion, MealOverride, MealPriority};
pub use schedule_item::{Category, ScheduleItem};
pub use transit_segment::TransitSegment;
