use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A packing or to-do entry, toggled locally by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
    pub due_date: Option<NaiveDate>,
    pub is_pre_trip: bool,
    pub sort_order: i64,
}

impl ChecklistItem {
    pub fn new(title: impl Into<String>, sort_order: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            is_completed: false,
            due_date: None,
            is_pre_trip: false,
            sort_order,
        }
    }

    pub fn pre_trip(mut self) -> Self {
        self.is_pre_trip = true;
        self
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }
}

impl fmt::Display for ChecklistItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.is_completed { "x" } else { " " };
        write!(f, "[{}] {}", mark, self.title)?;
        if let Some(due) = self.due_date {
            write!(f, " (due {})", due)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_marks() {
        let mut item = ChecklistItem::new("Pack rail pass", 1);
        assert_eq!(format!("{}", item), "[ ] Pack rail pass");
        item.is_completed = true;
        assert_eq!(format!("{}", item), "[x] Pack rail pass");
    }

    #[test]
    fn test_builders() {
        let due = NaiveDate::from_ymd_opt(2025, 4, 9).unwrap();
        let item = ChecklistItem::new("Print vouchers", 2)
            .pre_trip()
            .with_due_date(due);
        assert!(item.is_pre_trip);
        assert_eq!(item.due_date, Some(due));
    }
}
