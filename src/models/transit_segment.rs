use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Transit guidance attached to a schedule item (0..1 per item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitSegment {
    pub id: String,
    pub schedule_item_id: String,
    pub leave_by: NaiveTime,
    pub walk_minutes: Option<i64>,
    pub transfers: Option<i64>,
    pub line: Option<String>,
    pub from_station: Option<String>,
    pub to_station: Option<String>,
    pub arrive_by: Option<NaiveTime>,
}

impl TransitSegment {
    pub fn new(schedule_item_id: impl Into<String>, leave_by: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            schedule_item_id: schedule_item_id.into(),
            leave_by,
            walk_minutes: None,
            transfers: None,
            line: None,
            from_station: None,
            to_station: None,
            arrive_by: None,
        }
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = Some(line.into());
        self
    }

    pub fn with_walk_minutes(mut self, minutes: i64) -> Self {
        self.walk_minutes = Some(minutes);
        self
    }
}

impl fmt::Display for TransitSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "leave by {}", self.leave_by.format("%H:%M"))?;
        if let Some(line) = &self.line {
            write!(f, " ({})", line)?;
        }
        if let Some(walk) = self.walk_minutes {
            write!(f, ", {} min walk", walk)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let seg = TransitSegment::new("item-1", NaiveTime::from_hms_opt(8, 45, 0).unwrap())
            .with_line("JR Nara Line")
            .with_walk_minutes(7);
        let out = format!("{}", seg);
        assert!(out.contains("leave by 08:45"));
        assert!(out.contains("JR Nara Line"));
        assert!(out.contains("7 min walk"));
    }

    #[test]
    fn test_json_roundtrip() {
        let seg = TransitSegment::new("item-1", NaiveTime::from_hms_opt(8, 45, 0).unwrap());
        let json = serde_json::to_string(&seg).unwrap();
        let parsed: TransitSegment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, seg);
    }
}
