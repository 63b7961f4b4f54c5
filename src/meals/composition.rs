use time::Date;
use tracing::{debug, info, instrument, warn};

use crate::api::NutritionApi;
use crate::error::{ClientError, ValidationError};
use crate::foods::Food;
use crate::meals::dto::{CreateMealRequest, MealFoodEntry, MealId, MealType};
use crate::meals::nutrition::NutrientTotals;

pub const GRAMS_PER_SERVING: f64 = 100.0;
const GRAMS_UNIT: &str = "g";

/// Foods selected for a meal that hasn't been submitted yet, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealComposition {
    entries: Vec<MealFoodEntry>,
}

impl MealComposition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[MealFoodEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, food_id: i64) -> bool {
        self.entries.iter().any(|e| e.food_id == food_id)
    }

    /// Appends `food`. A recognized portion pre-fills the quantity, otherwise one
    /// 100 g serving is used.
    pub fn add(
        &mut self,
        food: &Food,
        recognized_portion_grams: Option<f64>,
    ) -> Result<&MealFoodEntry, ValidationError> {
        if self.contains(food.id) {
            return Err(ValidationError::DuplicateFood { food_id: food.id });
        }
        let grams = match recognized_portion_grams {
            Some(g) => valid_grams(g)?,
            None => GRAMS_PER_SERVING,
        };
        self.entries.push(MealFoodEntry {
            food_id: food.id,
            food_name: food.name.clone(),
            quantity: grams,
            quantity_unit: GRAMS_UNIT.to_string(),
            servings: grams / GRAMS_PER_SERVING,
        });
        debug!(food_id = food.id, grams, "food added to meal");
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn update_quantity(&mut self, index: usize, grams: f64) -> Result<(), ValidationError> {
        let grams = valid_grams(grams)?;
        let entry = self.entry_mut(index)?;
        entry.quantity = grams;
        entry.servings = grams / GRAMS_PER_SERVING;
        Ok(())
    }

    pub fn update_servings(&mut self, index: usize, servings: f64) -> Result<(), ValidationError> {
        let grams = valid_grams(servings * GRAMS_PER_SERVING)?;
        let entry = self.entry_mut(index)?;
        entry.quantity = grams;
        entry.servings = grams / GRAMS_PER_SERVING;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<MealFoodEntry, ValidationError> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    /// Totals of the entries, looking each food up in `catalog`. Entries whose
    /// food isn't in the catalog contribute nothing.
    pub fn preview(&self, catalog: &[Food]) -> NutrientTotals {
        self.entries
            .iter()
            .filter_map(|e| {
                catalog
                    .iter()
                    .find(|f| f.id == e.food_id)
                    .map(|f| NutrientTotals::of_food(f, e.servings))
            })
            .sum()
    }

    fn check_index(&self, index: usize) -> Result<(), ValidationError> {
        if index >= self.entries.len() {
            return Err(ValidationError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut MealFoodEntry, ValidationError> {
        self.check_index(index)?;
        Ok(&mut self.entries[index])
    }
}

fn valid_grams(grams: f64) -> Result<f64, ValidationError> {
    if grams.is_finite() && grams >= 0.0 {
        Ok(grams)
    } else {
        Err(ValidationError::InvalidQuantity)
    }
}

/// Everything the meal-entry screen collects before creating a meal.
#[derive(Debug, Clone, PartialEq)]
pub struct MealDraft {
    pub meal_type: MealType,
    pub meal_date: Date,
    pub notes: Option<String>,
    pub foods: MealComposition,
}

impl MealDraft {
    pub fn new(meal_type: MealType, meal_date: Date) -> Self {
        Self {
            meal_type,
            meal_date,
            notes: None,
            foods: MealComposition::new(),
        }
    }

    pub fn to_request(&self) -> Result<CreateMealRequest, ValidationError> {
        if self.foods.is_empty() {
            return Err(ValidationError::EmptyMeal);
        }
        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        Ok(CreateMealRequest {
            meal_type: self.meal_type,
            meal_date: self.meal_date,
            notes,
            foods: self.foods.entries().to_vec(),
        })
    }

    /// Sends the whole draft as a single create request.
    #[instrument(skip_all, fields(meal_type = ?self.meal_type, foods = self.foods.len()))]
    pub async fn submit(&self, api: &dyn NutritionApi) -> Result<MealId, ClientError> {
        let request = match self.to_request() {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "meal draft rejected");
                return Err(e.into());
            }
        };
        let id = api.create_meal(&request).await?;
        info!(meal_id = id, "meal created");
        Ok(id)
    }
}
