use chrono::{Duration, NaiveTime};

use crate::models::{Category, Meal, MealInclusion, MealOverride, ScheduleItem};

/// Minimum free stretch between consecutive items that counts as a
/// usable meal gap.
const MIN_GAP_MINUTES: i64 = 45;

/// A resolved meal for one trip day: when to eat and whether to offer
/// restaurant suggestions at all.
#[derive(Debug, Clone, PartialEq)]
pub struct MealSlot {
    pub meal: Meal,
    pub time: NaiveTime,
    /// False when the meal is covered (lodging-included, deliberately
    /// skipped) and suggestions would be noise.
    pub show_options: bool,
    pub reason: Option<String>,
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Canonical clock window in which each meal can plausibly happen.
fn window(meal: Meal) -> (NaiveTime, NaiveTime) {
    match meal {
        Meal::Breakfast => (hm(6, 30), hm(10, 30)),
        Meal::Lunch => (hm(11, 0), hm(14, 30)),
        Meal::Dinner => (hm(17, 0), hm(21, 0)),
    }
}

fn default_time(meal: Meal) -> NaiveTime {
    match meal {
        Meal::Breakfast => hm(8, 0),
        Meal::Lunch => hm(12, 30),
        Meal::Dinner => hm(18, 30),
    }
}

fn in_window(time: NaiveTime, meal: Meal) -> bool {
    let (start, end) = window(meal);
    start <= time && time < end
}

fn inclusion_reason(inclusion: MealInclusion) -> Option<String> {
    match inclusion {
        MealInclusion::None => None,
        MealInclusion::Lodging => Some("Included with lodging".to_string()),
        MealInclusion::ExplicitSkip => Some("Deliberately skipped".to_string()),
    }
}

/// Suggested time for a meal from the day's schedule alone: an
/// existing food item inside the window, else the start of the first
/// free stretch of at least 45 minutes inside the window, else the
/// meal's default time.
fn suggested_time(items: &[&ScheduleItem], meal: Meal) -> NaiveTime {
    if let Some(food) = items
        .iter()
        .find(|i| i.category == Category::Food && in_window(i.start_time, meal))
    {
        return food.start_time;
    }

    // Clamp each gap to the window so a gap straddling the window
    // boundary still counts for the part inside it.
    let (win_start, win_end) = window(meal);
    for pair in items.windows(2) {
        let end = match pair[0].duration_minutes {
            Some(minutes) => pair[0].start_time + Duration::minutes(minutes),
            None => continue,
        };
        let gap_start = end.max(win_start);
        let gap_end = pair[1].start_time.min(win_end);
        if gap_end - gap_start >= Duration::minutes(MIN_GAP_MINUTES) {
            return gap_start;
        }
    }

    default_time(meal)
}

/// Resolve all three meal slots for one day.
///
/// Exclusion precedence, highest first: a schedule item inside the
/// meal window carrying a non-default inclusion flag, then a per-day
/// override row. Everything else gets a suggested time and shows
/// restaurant options. Slots come back sorted by resolved time.
pub fn resolve_meal_slots(
    items: &[ScheduleItem],
    overrides: &[MealOverride],
    day_number: i64,
) -> Vec<MealSlot> {
    let mut day: Vec<&ScheduleItem> = items.iter().filter(|i| i.day_number == day_number).collect();
    day.sort_by_key(|i| i.sort_order);

    let mut slots: Vec<MealSlot> = Meal::ALL
        .iter()
        .map(|&meal| {
            if let Some(item) = day.iter().find(|i| {
                i.meal_inclusion != MealInclusion::None && in_window(i.start_time, meal)
            }) {
                return MealSlot {
                    meal,
                    time: item.start_time,
                    show_options: false,
                    reason: inclusion_reason(item.meal_inclusion),
                };
            }

            if let Some(row) = overrides
                .iter()
                .find(|o| o.day_number == day_number && o.meal == meal)
            {
                return MealSlot {
                    meal,
                    time: suggested_time(&day, meal),
                    show_options: false,
                    reason: row.reason.clone().or_else(|| inclusion_reason(row.inclusion)),
                };
            }

            MealSlot {
                meal,
                time: suggested_time(&day, meal),
                show_options: true,
                reason: None,
            }
        })
        .collect();

    slots.sort_by_key(|s| s.time);
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 16).unwrap()
    }

    fn item(day: i64, h: u32, m: u32, category: Category, title: &str, sort: i64) -> ScheduleItem {
        ScheduleItem::new(day, date(), hm(h, m), category, title, sort)
    }

    fn slot_for(slots: &[MealSlot], meal: Meal) -> &MealSlot {
        slots.iter().find(|s| s.meal == meal).unwrap()
    }

    #[test]
    fn test_empty_day_returns_three_default_slots() {
        let slots = resolve_meal_slots(&[], &[], 5);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].meal, Meal::Breakfast);
        assert_eq!(slots[0].time, hm(8, 0));
        assert_eq!(slots[1].meal, Meal::Lunch);
        assert_eq!(slots[1].time, hm(12, 30));
        assert_eq!(slots[2].meal, Meal::Dinner);
        assert_eq!(slots[2].time, hm(18, 30));
        assert!(slots.iter().all(|s| s.show_options));
    }

    #[test]
    fn test_food_item_in_window_adopted() {
        let items = vec![item(5, 12, 15, Category::Food, "Ramen at Ippudo", 1)];
        let slots = resolve_meal_slots(&items, &[], 5);
        let lunch = slot_for(&slots, Meal::Lunch);
        assert_eq!(lunch.time, hm(12, 15));
        assert!(lunch.show_options);
    }

    #[test]
    fn test_food_item_outside_window_ignored() {
        // 15:00 is after the lunch window closes.
        let items = vec![item(5, 15, 0, Category::Food, "Late snack", 1)];
        let slots = resolve_meal_slots(&items, &[], 5);
        assert_eq!(slot_for(&slots, Meal::Lunch).time, hm(12, 30));
    }

    #[test]
    fn test_gap_inside_window_used() {
        let items = vec![
            item(5, 11, 0, Category::Activity, "Museum", 1).with_duration(90),
            item(5, 14, 0, Category::Activity, "Garden walk", 2),
        ];
        // Museum ends 12:30; 90 free minutes before the walk.
        let slots = resolve_meal_slots(&items, &[], 5);
        let lunch = slot_for(&slots, Meal::Lunch);
        assert_eq!(lunch.time, hm(12, 30));
        assert!(lunch.show_options);
    }

    #[test]
    fn test_gap_straddling_window_start_clamped() {
        let items = vec![
            item(5, 9, 0, Category::Activity, "Museum", 1).with_duration(105),
            item(5, 14, 0, Category::Activity, "Garden walk", 2),
        ];
        // Museum ends 10:45, before the lunch window opens; the free
        // stretch from 11:00 onward still counts.
        let slots = resolve_meal_slots(&items, &[], 5);
        let lunch = slot_for(&slots, Meal::Lunch);
        assert_eq!(lunch.time, hm(11, 0));
        assert!(lunch.show_options);
    }

    #[test]
    fn test_short_gap_rejected() {
        let items = vec![
            item(5, 11, 0, Category::Activity, "Museum", 1).with_duration(90),
            item(5, 13, 0, Category::Activity, "Garden walk", 2),
        ];
        // Only 30 minutes free: fall back to the default.
        let slots = resolve_meal_slots(&items, &[], 5);
        assert_eq!(slot_for(&slots, Meal::Lunch).time, hm(12, 30));
    }

    #[test]
    fn test_inclusion_item_forces_exclusion() {
        let items = vec![item(7, 18, 30, Category::Food, "Kaiseki at ryokan", 1)
            .with_meal_inclusion(MealInclusion::Lodging)];
        let slots = resolve_meal_slots(&items, &[], 7);
        let dinner = slot_for(&slots, Meal::Dinner);
        assert!(!dinner.show_options);
        assert_eq!(dinner.time, hm(18, 30));
        assert_eq!(dinner.reason.as_deref(), Some("Included with lodging"));
    }

    #[test]
    fn test_override_row_forces_exclusion() {
        let overrides = vec![MealOverride {
            day_number: 8,
            meal: Meal::Breakfast,
            inclusion: MealInclusion::Lodging,
            reason: Some("Breakfast included with ryokan stay".to_string()),
        }];
        let slots = resolve_meal_slots(&[], &overrides, 8);
        let breakfast = slot_for(&slots, Meal::Breakfast);
        assert!(!breakfast.show_options);
        assert_eq!(
            breakfast.reason.as_deref(),
            Some("Breakfast included with ryokan stay")
        );
        // The other meals stay unaffected.
        assert!(slot_for(&slots, Meal::Lunch).show_options);
        assert!(slot_for(&slots, Meal::Dinner).show_options);
    }

    #[test]
    fn test_override_ignores_other_days() {
        let overrides = vec![MealOverride {
            day_number: 7,
            meal: Meal::Dinner,
            inclusion: MealInclusion::Lodging,
            reason: None,
        }];
        let slots = resolve_meal_slots(&[], &overrides, 6);
        assert!(slot_for(&slots, Meal::Dinner).show_options);
    }

    #[test]
    fn test_explicit_skip_reason() {
        let items = vec![item(5, 8, 0, Category::Activity, "Dawn hike", 1)
            .with_meal_inclusion(MealInclusion::ExplicitSkip)];
        let slots = resolve_meal_slots(&items, &[], 5);
        let breakfast = slot_for(&slots, Meal::Breakfast);
        assert!(!breakfast.show_options);
        assert_eq!(breakfast.reason.as_deref(), Some("Deliberately skipped"));
    }

    #[test]
    fn test_slots_sorted_by_resolved_time() {
        let items = vec![item(5, 7, 0, Category::Food, "Market breakfast", 1)];
        let slots = resolve_meal_slots(&items, &[], 5);
        let times: Vec<NaiveTime> = slots.iter().map(|s| s.time).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
    }
}
