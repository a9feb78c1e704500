use chrono::{Duration, NaiveDateTime};

use crate::models::ScheduleItem;

/// The next thing on the plan, with a three-tier fallback:
/// the first unstarted item today, then tomorrow's first item, then
/// the globally-first future item for dates outside the trip range.
/// When every item is in the past, the very first item overall is
/// returned so the UI always has something to anchor on.
pub fn next_item(items: &[ScheduleItem], now: NaiveDateTime) -> Option<ScheduleItem> {
    if items.is_empty() {
        return None;
    }

    let today = now.date();
    let mut todays: Vec<&ScheduleItem> = items
        .iter()
        .filter(|i| i.date == today && i.start_time > now.time())
        .collect();
    todays.sort_by_key(|i| (i.start_time, i.sort_order));
    if let Some(item) = todays.first() {
        return Some((*item).clone());
    }

    let tomorrow = today + Duration::days(1);
    let mut tomorrows: Vec<&ScheduleItem> = items.iter().filter(|i| i.date == tomorrow).collect();
    tomorrows.sort_by_key(|i| i.sort_order);
    if let Some(item) = tomorrows.first() {
        return Some((*item).clone());
    }

    let mut future: Vec<&ScheduleItem> = items.iter().filter(|i| i.date > today).collect();
    future.sort_by_key(|i| (i.date, i.sort_order));
    if let Some(item) = future.first() {
        return Some((*item).clone());
    }

    let mut all: Vec<&ScheduleItem> = items.iter().collect();
    all.sort_by_key(|i| (i.date, i.sort_order));
    all.first().map(|item| (*item).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::{NaiveDate, NaiveTime};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn item(d: u32, h: u32, title: &str, sort: i64) -> ScheduleItem {
        ScheduleItem::new(
            (d - 9) as i64,
            date(d),
            NaiveTime::from_hms_opt(h, 0, 0).unwrap(),
            Category::Activity,
            title,
            sort,
        )
    }

    fn trip() -> Vec<ScheduleItem> {
        vec![
            item(10, 9, "Arrival", 1),
            item(10, 15, "Check in", 2),
            item(11, 9, "Fushimi Inari", 1),
            item(12, 10, "Nara day trip", 1),
        ]
    }

    #[test]
    fn test_first_unstarted_item_today() {
        let now = date(10).and_hms_opt(10, 0, 0).unwrap();
        assert_eq!(next_item(&trip(), now).unwrap().title, "Check in");
    }

    #[test]
    fn test_today_exhausted_falls_to_tomorrow() {
        let now = date(10).and_hms_opt(20, 0, 0).unwrap();
        assert_eq!(next_item(&trip(), now).unwrap().title, "Fushimi Inari");
    }

    #[test]
    fn test_gap_day_falls_to_first_future() {
        // No items on the 13th or 14th; browsing from the 13th skips
        // to nothing tomorrow and nothing later either.
        let mut items = trip();
        items.push(item(16, 9, "Departure", 1));
        let now = date(13).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(next_item(&items, now).unwrap().title, "Departure");
    }

    #[test]
    fn test_before_trip_returns_first_future() {
        let now = date(1).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(next_item(&trip(), now).unwrap().title, "Arrival");
    }

    #[test]
    fn test_after_trip_returns_first_item_overall() {
        let now = date(25).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(next_item(&trip(), now).unwrap().title, "Arrival");
    }

    #[test]
    fn test_no_items_at_all() {
        let now = date(10).and_hms_opt(12, 0, 0).unwrap();
        assert!(next_item(&[], now).is_none());
    }
}
