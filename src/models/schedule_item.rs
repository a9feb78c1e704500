use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::meal::MealInclusion;

/// What kind of thing a schedule item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Activity,
    Food,
    Transit,
    Lodging,
    Shopping,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Activity => write!(f, "activity"),
            Category::Food => write!(f, "food"),
            Category::Transit => write!(f, "transit"),
            Category::Lodging => write!(f, "lodging"),
            Category::Shopping => write!(f, "shopping"),
            Category::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "activity" => Ok(Category::Activity),
            "food" => Ok(Category::Food),
            "transit" => Ok(Category::Transit),
            "lodging" => Ok(Category::Lodging),
            "shopping" => Ok(Category::Shopping),
            "other" => Ok(Category::Other),
            _ => Err(format!(
                "Invalid category '{}'. Valid options: activity, food, transit, lodging, shopping, other",
                s
            )),
        }
    }
}

/// One entry on the day plan.
///
/// Within a day, `sort_order` is a total order: it drives list display
/// and the gap calculations the meal resolver relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: String,
    pub day_number: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: Option<i64>,
    pub category: Category,
    pub title: String,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub notes: Option<String>,
    pub meal_inclusion: MealInclusion,
    pub sort_order: i64,
}

impl ScheduleItem {
    pub fn new(
        day_number: i64,
        date: NaiveDate,
        start_time: NaiveTime,
        category: Category,
        title: impl Into<String>,
        sort_order: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            day_number,
            date,
            start_time,
            duration_minutes: None,
            category,
            title: title.into(),
            location_name: None,
            address: None,
            lat: None,
            lon: None,
            notes: None,
            meal_inclusion: MealInclusion::None,
            sort_order,
        }
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_location(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_meal_inclusion(mut self, inclusion: MealInclusion) -> Self {
        self.meal_inclusion = inclusion;
        self
    }
}

impl fmt::Display for ScheduleItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}]",
            self.start_time.format("%H:%M"),
            self.title,
            self.category
        )?;
        if let Some(loc) = &self.location_name {
            write!(f, " @ {}", loc)?;
        }
        Ok(())
    }
}
