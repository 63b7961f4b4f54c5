//! Calorie and macro totals for logged meals.
//!
//! Accumulation runs at full `f64` precision; [`NutrientTotals::rounded`]
//! applies display rounding once, at the end.

use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use crate::foods::Food;
use crate::meals::dto::{LoggedMealFood, Meal, MealId, MealType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sodium: f64,
}

/// Presentation values: calories and sodium whole, macros to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundedTotals {
    pub calories: i64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sodium: i64,
}

impl NutrientTotals {
    /// Contribution of `food` scaled by `multiplier`. Missing nutrients add nothing.
    pub fn of_food(food: &Food, multiplier: f64) -> Self {
        let scaled = |v: Option<f64>| v.map_or(0.0, |n| n * multiplier);
        Self {
            calories: scaled(food.calories),
            protein: scaled(food.protein),
            carbohydrates: scaled(food.carbohydrates),
            fat: scaled(food.fat),
            fiber: scaled(food.fiber),
            sodium: scaled(food.sodium),
        }
    }

    pub fn add(&mut self, other: &NutrientTotals) {
        self.calories += other.calories;
        self.protein += other.protein;
        self.carbohydrates += other.carbohydrates;
        self.fat += other.fat;
        self.fiber += other.fiber;
        self.sodium += other.sodium;
    }

    pub fn rounded(&self) -> RoundedTotals {
        RoundedTotals {
            calories: self.calories.round() as i64,
            protein: round_one_decimal(self.protein),
            carbohydrates: round_one_decimal(self.carbohydrates),
            fat: round_one_decimal(self.fat),
            fiber: round_one_decimal(self.fiber),
            sodium: self.sodium.round() as i64,
        }
    }
}

impl std::iter::Sum for NutrientTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientTotals::default(), |mut acc, t| {
            acc.add(&t);
            acc
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealTotals {
    pub meal_id: MealId,
    pub meal_type: MealType,
    pub totals: NutrientTotals,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayTotals {
    pub meals: Vec<MealTotals>,
    pub day: NutrientTotals,
}

/// Serving multiplier of a logged line; defaults to one 100 g unit.
pub fn multiplier(entry: &LoggedMealFood) -> f64 {
    entry.servings.unwrap_or(1.0)
}

pub fn entry_totals(entry: &LoggedMealFood) -> NutrientTotals {
    entry
        .food
        .as_ref()
        .map(|food| NutrientTotals::of_food(food, multiplier(entry)))
        .unwrap_or_default()
}

pub fn meal_totals(meal: &Meal) -> NutrientTotals {
    meal.meal_foods.iter().map(entry_totals).sum()
}

/// Per-meal and whole-day totals, in the order the meals were given.
pub fn aggregate(meals: &[Meal]) -> DayTotals {
    let meals: Vec<MealTotals> = meals
        .iter()
        .map(|m| MealTotals {
            meal_id: m.id,
            meal_type: m.meal_type,
            totals: meal_totals(m),
        })
        .collect();
    let day = meals.iter().map(|m| m.totals).sum();
    DayTotals { meals, day }
}

/// Groups a date range by `mealDate`, ascending, aggregating each day.
pub fn totals_by_day(meals: &[Meal]) -> BTreeMap<Date, DayTotals> {
    let mut by_day: BTreeMap<Date, Vec<Meal>> = BTreeMap::new();
    for meal in meals {
        by_day.entry(meal.meal_date).or_default().push(meal.clone());
    }
    by_day
        .into_iter()
        .map(|(date, meals)| (date, aggregate(&meals)))
        .collect()
}

fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
