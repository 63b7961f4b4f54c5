pub mod composition;
pub mod dto;
pub mod nutrition;

pub use composition::{MealComposition, MealDraft};
pub use dto::{CreateMealRequest, LoggedMealFood, Meal, MealFoodEntry, MealId, MealType};
pub use nutrition::{aggregate, entry_totals, meal_totals, totals_by_day, DayTotals, NutrientTotals};
