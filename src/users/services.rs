use crate::error::ValidationError;
use crate::users::dto::ProfileUpdate;

/// Range checks before a profile update leaves the client.
pub fn validate_update(update: &ProfileUpdate) -> Result<(), ValidationError> {
    if let Some(age) = update.age {
        if !(1..=150).contains(&age) {
            return Err(ValidationError::InvalidProfile {
                field: "age",
                reason: "must be between 1 and 150",
            });
        }
    }
    if let Some(weight) = update.weight {
        if !(weight.is_finite() && weight > 0.0) {
            return Err(ValidationError::InvalidProfile {
                field: "weight",
                reason: "must be a positive number of kilograms",
            });
        }
    }
    if let Some(height) = update.height {
        if !(height.is_finite() && height > 0.0) {
            return Err(ValidationError::InvalidProfile {
                field: "height",
                reason: "must be a positive number of centimetres",
            });
        }
    }
    if let Some(goal) = update.daily_calorie_goal {
        if goal <= 0 {
            return Err(ValidationError::InvalidProfile {
                field: "daily calorie goal",
                reason: "must be positive",
            });
        }
    }
    Ok(())
}
