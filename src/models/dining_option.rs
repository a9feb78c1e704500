use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::meal::{Meal, MealPriority};

/// Assignment of a dining option to a specific (day, meal) slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedMeal {
    pub day: i64,
    pub date: NaiveDate,
    pub meal: Meal,
    pub priority: MealPriority,
}

/// A restaurant or food stop that can be suggested for meal slots.
///
/// `day_number`/`city`/`meal` are the legacy single-assignment fields;
/// `assigned_meals` is the current multi-slot assignment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningOption {
    pub id: String,
    pub name: String,
    pub day_number: Option<i64>,
    pub city: Option<String>,
    pub meal: Option<Meal>,
    pub cuisine: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub assigned_meals: Vec<AssignedMeal>,
}

impl DiningOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            day_number: None,
            city: None,
            meal: None,
            cuisine: None,
            address: None,
            lat: None,
            lon: None,
            assigned_meals: Vec::new(),
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    pub fn with_assignments(mut self, assigned: Vec<AssignedMeal>) -> Self {
        self.assigned_meals = assigned;
        self
    }

    /// Whether this option is assigned to the given slot.
    pub fn assigned_to(&self, day: i64, meal: Meal) -> Option<&AssignedMeal> {
        self.assigned_meals
            .iter()
            .find(|a| a.day == day && a.meal == meal)
    }
}

impl fmt::Display for DiningOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(cuisine) = &self.cuisine {
            write!(f, " ({})", cuisine)?;
        }
        if let Some(city) = &self.city {
            write!(f, " - {}", city)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assigned_to() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 12).unwrap();
        let option = DiningOption::new("Ichiran").with_assignments(vec![AssignedMeal {
            day: 3,
            date,
            meal: Meal::Lunch,
            priority: MealPriority::Primary,
        }]);

        assert!(option.assigned_to(3, Meal::Lunch).is_some());
        assert!(option.assigned_to(3, Meal::Dinner).is_none());
        assert!(option.assigned_to(4, Meal::Lunch).is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 12).unwrap();
        let option = DiningOption::new("Ichiran")
            .with_city("Kyoto")
            .with_cuisine("ramen")
            .with_assignments(vec![AssignedMeal {
                day: 3,
                date,
                meal: Meal::Dinner,
                priority: MealPriority::Alternative,
            }]);

        let json = serde_json::to_string(&option).unwrap();
        let parsed: DiningOption = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, option);
    }
}
