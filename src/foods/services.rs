use crate::error::ValidationError;
use crate::foods::dto::NewFood;
use crate::foods::is_valid_barcode;

/// Checks a user-entered food before it is sent; trims text fields in place.
pub fn validate_new_food(food: &mut NewFood) -> Result<(), ValidationError> {
    food.name = food.name.trim().to_string();
    if food.name.is_empty() {
        return Err(ValidationError::Blank("Name"));
    }
    if let Some(code) = food.barcode.as_mut() {
        *code = code.trim().to_string();
        if !is_valid_barcode(code) {
            return Err(ValidationError::InvalidBarcode);
        }
    }
    let amounts = [
        ("Calories", Some(food.calories)),
        ("Serving size", food.serving_size),
        ("Protein", food.protein),
        ("Carbohydrates", food.carbohydrates),
        ("Fat", food.fat),
        ("Fiber", food.fiber),
        ("Sugar", food.sugar),
        ("Sodium", food.sodium),
        ("Cholesterol", food.cholesterol),
    ];
    for (field, value) in amounts {
        if let Some(v) = value {
            if !(v.is_finite() && v >= 0.0) {
                return Err(ValidationError::InvalidNutrient { field });
            }
        }
    }
    Ok(())
}
