use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A place to stay over a half-open `[start_date, end_date)` interval.
///
/// Seed and sync data guarantee the intervals tile the trip with no
/// gaps or overlaps; resolvers rely on that but do not enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lodging {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub sort_order: i64,
}

impl Lodging {
    pub fn new(
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        sort_order: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            start_date,
            end_date,
            address: None,
            phone: None,
            notes: None,
            sort_order,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Half-open membership: start inclusive, end exclusive.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date < self.end_date
    }
}

impl fmt::Display for Lodging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} to {})",
            self.name, self.start_date, self.end_date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    #[test]
    fn test_covers_half_open() {
        let stay = Lodging::new("Hotel Granvia", date(10), date(14), 1);
        assert!(stay.covers(date(10)));
        assert!(stay.covers(date(13)));
        assert!(!stay.covers(date(14)));
        assert!(!stay.covers(date(9)));
    }

    #[test]
    fn test_display() {
        let stay = Lodging::new("Hotel Granvia", date(10), date(14), 1);
        let out = format!("{}", stay);
        assert!(out.contains("Hotel Granvia"));
        assert!(out.contains("2025-04-10"));
    }
}
