//! Typed facade over the backend REST API.

mod http;

use async_trait::async_trait;
use time::Date;

use crate::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::ApiError;
use crate::foods::{Food, NewFood};
use crate::images::{ImageUpload, RecognizedFoodCandidate};
use crate::meals::{CreateMealRequest, Meal, MealId};
use crate::users::{ProfileUpdate, UserProfile};

pub use http::HttpApi;

#[async_trait]
pub trait NutritionApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError>;
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;

    async fn profile(&self) -> Result<UserProfile, ApiError>;
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError>;
    /// `None` when the profile lacks what the estimate needs.
    async fn recommended_calories(&self) -> Result<Option<i32>, ApiError>;

    /// Empty when nothing matches.
    async fn search_foods(&self, name: &str) -> Result<Vec<Food>, ApiError>;
    async fn food(&self, id: i64) -> Result<Food, ApiError>;
    async fn food_by_barcode(&self, barcode: &str) -> Result<Option<Food>, ApiError>;
    /// Adds a user-entered food to the catalog and returns the stored record.
    async fn create_food(&self, food: &NewFood) -> Result<Food, ApiError>;
    async fn analyze_image(
        &self,
        image: &ImageUpload,
    ) -> Result<Vec<RecognizedFoodCandidate>, ApiError>;

    async fn create_meal(&self, request: &CreateMealRequest) -> Result<MealId, ApiError>;
    async fn meal(&self, id: MealId) -> Result<Meal, ApiError>;
    async fn meals_by_date(&self, date: Date) -> Result<Vec<Meal>, ApiError>;
    async fn meals_in_range(&self, start: Date, end: Date) -> Result<Vec<Meal>, ApiError>;
    async fn delete_meal(&self, id: MealId) -> Result<(), ApiError>;
}
