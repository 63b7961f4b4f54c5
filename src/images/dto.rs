use serde::{Deserialize, Serialize};

use crate::decode::lenient_f64;

/// A food the image analysis thinks it saw, with an estimated weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedFoodCandidate {
    pub food_name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub estimated_portion: Option<f64>,
    #[serde(default = "default_unit", deserialize_with = "unit_or_grams")]
    pub portion_unit: String,
}

fn default_unit() -> String {
    "g".to_string()
}

fn unit_or_grams<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_unit))
}

impl RecognizedFoodCandidate {
    /// The estimate in grams, when it is expressed in grams at all.
    pub fn portion_grams(&self) -> Option<f64> {
        let unit = self.portion_unit.trim().to_ascii_lowercase();
        let is_grams = matches!(unit.as_str(), "g" | "gram" | "grams");
        self.estimated_portion.filter(|g| is_grams && *g >= 0.0)
    }
}
