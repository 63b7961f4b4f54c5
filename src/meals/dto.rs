use serde::{Deserialize, Serialize};
use time::Date;

use crate::decode::{lenient_f64, lenient_record, lenient_seq};
use crate::foods::Food;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub type MealId = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown meal type `{s}` (breakfast, lunch, dinner, snack)"))
    }
}

/// A logged meal as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: MealId,
    pub meal_type: MealType,
    #[serde(with = "iso_date")]
    pub meal_date: Date,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub meal_foods: Vec<LoggedMealFood>,
}

/// One food line inside a logged meal. The nested food may be missing when
/// the backend did not load the association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedMealFood {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_record")]
    pub food: Option<Food>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub quantity_unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub servings: Option<f64>,
}

impl LoggedMealFood {
    pub fn display_name(&self) -> &str {
        self.food
            .as_ref()
            .map(|f| f.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown food")
    }
}

/// A food being composed into a new meal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealFoodEntry {
    pub food_id: i64,
    pub food_name: String,
    pub quantity: f64,
    pub quantity_unit: String,
    pub servings: f64,
}

/// Body of `POST /meals`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub meal_type: MealType,
    #[serde(with = "iso_date")]
    pub meal_date: Date,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub foods: Vec<MealFoodEntry>,
}

/// The created meal echoed back; only the id matters to callers.
#[derive(Debug, Deserialize)]
pub struct CreatedMeal {
    pub id: MealId,
}

pub fn format_date(date: Date) -> String {
    let fmt = time::macros::format_description!("[year]-[month]-[day]");
    date.format(&fmt).unwrap_or_else(|_| date.to_string())
}

pub fn parse_date(s: &str) -> Result<Date, time::error::Parse> {
    let fmt = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(s.trim(), &fmt)
}
