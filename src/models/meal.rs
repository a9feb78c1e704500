use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical meal categories resolved per trip day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

impl Meal {
    pub const ALL: [Meal; 3] = [Meal::Breakfast, Meal::Lunch, Meal::Dinner];
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meal::Breakfast => write!(f, "breakfast"),
            Meal::Lunch => write!(f, "lunch"),
            Meal::Dinner => write!(f, "dinner"),
        }
    }
}

impl FromStr for Meal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(Meal::Breakfast),
            "lunch" => Ok(Meal::Lunch),
            "dinner" => Ok(Meal::Dinner),
            _ => Err(format!(
                "Invalid meal '{}'. Valid options: breakfast, lunch, dinner",
                s
            )),
        }
    }
}

/// Priority of a dining option assignment for a given (day, meal) slot.
///
/// At most one `primary` or `included` assignment exists per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealPriority {
    Primary,
    Alternative,
    Included,
}

impl fmt::Display for MealPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealPriority::Primary => write!(f, "primary"),
            MealPriority::Alternative => write!(f, "alternative"),
            MealPriority::Included => write!(f, "included"),
        }
    }
}

impl FromStr for MealPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(MealPriority::Primary),
            "alternative" => Ok(MealPriority::Alternative),
            "included" => Ok(MealPriority::Included),
            _ => Err(format!(
                "Invalid meal priority '{}'. Valid options: primary, alternative, included",
                s
            )),
        }
    }
}

/// Structured meal-inclusion flag on a schedule item.
///
/// Replaces free-text note matching: the data says whether the meal is
/// covered by lodging or deliberately skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MealInclusion {
    #[default]
    None,
    Lodging,
    ExplicitSkip,
}

impl fmt::Display for MealInclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealInclusion::None => write!(f, "none"),
            MealInclusion::Lodging => write!(f, "lodging"),
            MealInclusion::ExplicitSkip => write!(f, "explicit-skip"),
        }
    }
}

impl FromStr for MealInclusion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(MealInclusion::None),
            "lodging" => Ok(MealInclusion::Lodging),
            "explicit-skip" | "skip" => Ok(MealInclusion::ExplicitSkip),
            _ => Err(format!(
                "Invalid meal inclusion '{}'. Valid options: none, lodging, explicit-skip",
                s
            )),
        }
    }
}

/// Per-day meal exclusion row, keyed by (day, meal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealOverride {
    pub day_number: i64,
    pub meal: Meal,
    pub inclusion: MealInclusion,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_display_and_parse() {
        assert_eq!(format!("{}", Meal::Breakfast), "breakfast");
        assert_eq!(Meal::from_str("DINNER").unwrap(), Meal::Dinner);
        assert!(Meal::from_str("snack").is_err());
    }

    #[test]
    fn test_meal_json_roundtrip() {
        let json = serde_json::to_string(&Meal::Lunch).unwrap();
        assert_eq!(json, "\"lunch\"");
        let parsed: Meal = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Meal::Lunch);
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(
            MealPriority::from_str("primary").unwrap(),
            MealPriority::Primary
        );
        assert_eq!(
            MealPriority::from_str("Included").unwrap(),
            MealPriority::Included
        );
        assert!(MealPriority::from_str("optional").is_err());
    }

    #[test]
    fn test_inclusion_default_is_none() {
        assert_eq!(MealInclusion::default(), MealInclusion::None);
    }

    #[test]
    fn test_inclusion_kebab_case_serde() {
        let json = serde_json::to_string(&MealInclusion::ExplicitSkip).unwrap();
        assert_eq!(json, "\"explicit-skip\"");
        assert_eq!(
            MealInclusion::from_str("explicit-skip").unwrap(),
            MealInclusion::ExplicitSkip
        );
    }
}
