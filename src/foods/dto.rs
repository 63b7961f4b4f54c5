use serde::{Deserialize, Serialize};

use crate::decode::lenient_f64;

/// Where a catalog entry came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FoodSource {
    Usda,
    #[serde(rename = "OPENFOODFACTS")]
    OpenFoodFacts,
    UserCreated,
    AiRecognized,
    #[serde(other)]
    Other,
}

/// Catalog food. Nutrients are per 100 g and any of them may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub source: Option<FoodSource>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub serving_size: Option<f64>,
    #[serde(default)]
    pub serving_unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub protein: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub carbohydrates: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fiber: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sugar: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sodium: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cholesterol: Option<f64>,
}

impl Food {
    /// Bare record with only identity set; nutrients filled in by callers.
    pub fn named(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            brand: None,
            description: None,
            barcode: None,
            source: None,
            serving_size: None,
            serving_unit: None,
            calories: None,
            protein: None,
            carbohydrates: None,
            fat: None,
            fiber: None,
            sugar: None,
            sodium: None,
            cholesterol: None,
        }
    }
}

/// Body of `POST /foods`: a user-entered catalog food, nutrients per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFood {
    pub name: String,
    pub calories: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<f64>,
    pub source: FoodSource,
}

impl NewFood {
    pub fn new(name: impl Into<String>, calories: f64) -> Self {
        Self {
            name: name.into(),
            calories,
            brand: None,
            description: None,
            barcode: None,
            serving_size: None,
            serving_unit: None,
            protein: None,
            carbohydrates: None,
            fat: None,
            fiber: None,
            sugar: None,
            sodium: None,
            cholesterol: None,
            source: FoodSource::UserCreated,
        }
    }
}

/// Body of `GET /barcode/{code}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeResponse {
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub food: Option<Food>,
}

impl BarcodeResponse {
    pub fn into_food(self) -> Option<Food> {
        if self.found {
            self.food
        } else {
            None
        }
    }
}
