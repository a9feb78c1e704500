use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::models::ScheduleItem;

/// End-of-day sentinel used as the last item's end time when it has no
/// duration.
fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap()
}

/// End time of the item at `idx` within a day's sorted item list:
/// `start + duration` when a duration is set, otherwise the next
/// item's start, otherwise the end-of-day sentinel.
fn end_time(items: &[&ScheduleItem], idx: usize) -> NaiveTime {
    let item = items[idx];
    if let Some(minutes) = item.duration_minutes {
        return item.start_time + Duration::minutes(minutes);
    }
    match items.get(idx + 1) {
        Some(next) => next.start_time,
        None => end_of_day(),
    }
}

/// The item happening right now, or the day's last item once the
/// schedule is exhausted.
///
/// Before the first item starts there is nothing current and the
/// answer is `None`; after the last item ends the last item stays
/// "current" so the UI keeps showing where you most recently were.
/// That asymmetry is deliberate.
pub fn current_item(items: &[ScheduleItem], now: NaiveDateTime) -> Option<ScheduleItem> {
    let mut today: Vec<&ScheduleItem> = items.iter().filter(|i| i.date == now.date()).collect();
    today.sort_by_key(|i| i.sort_order);
    if today.is_empty() {
        return None;
    }

    let time = now.time();
    for (idx, item) in today.iter().enumerate() {
        if item.start_time <= time && time < end_time(&today, idx) {
            return Some((*item).clone());
        }
    }

    // Only past the final item's end does the last item stay current;
    // before the day and in mid-day gaps nothing is.
    if time >= end_time(&today, today.len() - 1) {
        return today.last().map(|item| (*item).clone());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 12).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    fn item(h: u32, m: u32, title: &str, sort: i64) -> ScheduleItem {
        ScheduleItem::new(
            3,
            date(),
            NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            Category::Activity,
            title,
            sort,
        )
    }

    fn day() -> Vec<ScheduleItem> {
        vec![
            item(9, 0, "Fushimi Inari", 1).with_duration(120),
            item(12, 30, "Lunch at Nishiki", 2),
            item(14, 0, "Kiyomizu-dera", 3).with_duration(90),
        ]
    }

    #[test]
    fn test_inside_duration_interval() {
        let found = current_item(&day(), at(9, 45)).unwrap();
        assert_eq!(found.title, "Fushimi Inari");
    }

    #[test]
    fn test_no_duration_ends_at_next_start() {
        let items = day();
        // Lunch has no duration: current until Kiyomizu-dera starts.
        assert_eq!(
            current_item(&items, at(13, 59)).unwrap().title,
            "Lunch at Nishiki"
        );
        assert_eq!(
            current_item(&items, at(14, 0)).unwrap().title,
            "Kiyomizu-dera"
        );
    }

    #[test]
    fn test_before_first_item_is_absent() {
        assert!(current_item(&day(), at(7, 0)).is_none());
    }

    #[test]
    fn test_gap_between_items_is_absent() {
        // 11:00–12:30 is between the first item's end and lunch.
        assert!(current_item(&day(), at(11, 30)).is_none());
    }

    #[test]
    fn test_after_last_item_falls_back_to_last() {
        let items = vec![item(20, 0, "Pontocho dinner", 1).with_duration(60)];
        // Ends 21:00, but at 23:59 the last item is still the answer.
        let found = current_item(&items, at(23, 59)).unwrap();
        assert_eq!(found.title, "Pontocho dinner");
    }

    #[test]
    fn test_last_item_without_duration_runs_to_end_of_day() {
        let items = day();
        let found = current_item(&items, at(22, 0)).unwrap();
        assert_eq!(found.title, "Kiyomizu-dera");
    }

    #[test]
    fn test_other_dates_ignored() {
        let mut items = day();
        items.push(ScheduleItem::new(
            4,
            NaiveDate::from_ymd_opt(2025, 4, 13).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            Category::Activity,
            "Nara day trip",
            1,
        ));
        let found = current_item(&items, at(9, 30)).unwrap();
        assert_eq!(found.title, "Fushimi Inari");
    }

    #[test]
    fn test_empty_day_is_absent() {
        assert!(current_item(&[], at(12, 0)).is_none());
    }
}
