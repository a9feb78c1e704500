use chrono::{Duration, NaiveDate};

use crate::models::Lodging;

/// The stay whose half-open `[start_date, end_date)` interval contains
/// the given date. Seed data tiles the trip without gaps or overlaps,
/// so at most one stay matches.
pub fn lodging_for_date(stays: &[Lodging], date: NaiveDate) -> Option<&Lodging> {
    stays.iter().find(|stay| stay.covers(date))
}

/// Where you sleep on the night following `date`.
pub fn tonight(stays: &[Lodging], date: NaiveDate) -> Option<&Lodging> {
    lodging_for_date(stays, date)
}

/// Where you slept the night before `date`.
pub fn last_night(stays: &[Lodging], date: NaiveDate) -> Option<&Lodging> {
    lodging_for_date(stays, date - Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn stays() -> Vec<Lodging> {
        vec![
            Lodging::new("Hotel Granvia", date(10), date(14), 1),
            Lodging::new("Yoshida-sanso", date(14), date(17), 2),
        ]
    }

    #[test]
    fn test_boundary_date_resolves_to_second_interval() {
        let stays = stays();
        let stay = lodging_for_date(&stays, date(14)).unwrap();
        assert_eq!(stay.name, "Yoshida-sanso");
    }

    #[test]
    fn test_date_outside_all_intervals() {
        let stays = stays();
        assert!(lodging_for_date(&stays, date(9)).is_none());
        assert!(lodging_for_date(&stays, date(17)).is_none());
    }

    #[test]
    fn test_tonight_and_last_night_across_changeover() {
        let stays = stays();
        // Changeover day: slept at the first place, sleeping at the
        // second.
        assert_eq!(last_night(&stays, date(14)).unwrap().name, "Hotel Granvia");
        assert_eq!(tonight(&stays, date(14)).unwrap().name, "Yoshida-sanso");
    }

    #[test]
    fn test_last_night_on_first_morning() {
        let stays = stays();
        assert!(last_night(&stays, date(10)).is_none());
    }
}
