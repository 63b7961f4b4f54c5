pub mod dto;
pub mod services;

pub use dto::RecognizedFoodCandidate;
pub use services::{parse_candidates, ImageUpload};
