//! In-memory `NutritionApi` for controller tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::Date;

use crate::api::NutritionApi;
use crate::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::ApiError;
use crate::foods::{Food, NewFood};
use crate::images::{ImageUpload, RecognizedFoodCandidate};
use crate::meals::{CreateMealRequest, Meal, MealId};
use crate::users::{ProfileUpdate, UserProfile};

#[derive(Default)]
struct FakeBackend {
    foods: Vec<Food>,
    barcodes: HashMap<String, Food>,
    candidates: Vec<RecognizedFoodCandidate>,
    meals: Vec<Meal>,
    profile: UserProfile,
    recommended: Option<i32>,
    failures: HashMap<&'static str, ApiError>,
    created: Vec<CreateMealRequest>,
    created_foods: Vec<NewFood>,
    deleted: Vec<MealId>,
    searches: Vec<String>,
    profile_updates: Vec<ProfileUpdate>,
    logins: usize,
}

/// Canned backend. `fail_next` makes the named operation fail once.
#[derive(Default)]
pub struct FakeApi {
    inner: Mutex<FakeBackend>,
}

impl FakeApi {
    pub fn with_foods(self, foods: Vec<Food>) -> Self {
        self.inner.lock().unwrap().foods = foods;
        self
    }

    pub fn with_barcode(self, code: &str, food: Food) -> Self {
        self.inner
            .lock()
            .unwrap()
            .barcodes
            .insert(code.to_string(), food);
        self
    }

    pub fn with_candidates(self, candidates: Vec<RecognizedFoodCandidate>) -> Self {
        self.inner.lock().unwrap().candidates = candidates;
        self
    }

    pub fn with_meals(self, meals: Vec<Meal>) -> Self {
        self.inner.lock().unwrap().meals = meals;
        self
    }

    pub fn with_profile(self, profile: UserProfile) -> Self {
        self.inner.lock().unwrap().profile = profile;
        self
    }

    pub fn with_recommended(self, kcal: Option<i32>) -> Self {
        self.inner.lock().unwrap().recommended = kcal;
        self
    }

    pub fn fail_next(&self, op: &'static str, err: ApiError) {
        self.inner.lock().unwrap().failures.insert(op, err);
    }

    pub fn created_meals(&self) -> Vec<CreateMealRequest> {
        self.inner.lock().unwrap().created.clone()
    }

    pub fn created_foods(&self) -> Vec<NewFood> {
        self.inner.lock().unwrap().created_foods.clone()
    }

    pub fn deleted_meals(&self) -> Vec<MealId> {
        self.inner.lock().unwrap().deleted.clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.inner.lock().unwrap().searches.clone()
    }

    pub fn profile_updates(&self) -> Vec<ProfileUpdate> {
        self.inner.lock().unwrap().profile_updates.clone()
    }

    pub fn login_calls(&self) -> usize {
        self.inner.lock().unwrap().logins
    }

    fn check(&self, op: &'static str) -> Result<(), ApiError> {
        match self.inner.lock().unwrap().failures.remove(op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub fn unauthorized() -> ApiError {
    ApiError::Unauthorized {
        status: 401,
        message: "Full authentication is required".into(),
    }
}

pub fn server_error(message: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        message: message.into(),
    }
}

#[async_trait]
impl NutritionApi for FakeApi {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.check("register")?;
        Ok(AuthResponse {
            token: format!("token-{}", request.username),
            id: Some(1),
            username: request.username.clone(),
            email: Some(request.email.clone()),
        })
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.inner.lock().unwrap().logins += 1;
        self.check("login")?;
        Ok(AuthResponse {
            token: format!("token-{}", request.username),
            id: Some(1),
            username: request.username.clone(),
            email: None,
        })
    }

    async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.check("profile")?;
        Ok(self.inner.lock().unwrap().profile.clone())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.check("update_profile")?;
        let mut inner = self.inner.lock().unwrap();
        inner.profile_updates.push(update.clone());
        let p = &mut inner.profile;
        if let Some(v) = &update.full_name {
            p.full_name = Some(v.clone());
        }
        if update.age.is_some() {
            p.age = update.age;
        }
        if update.weight.is_some() {
            p.weight = update.weight;
        }
        if update.height.is_some() {
            p.height = update.height;
        }
        if update.gender.is_some() {
            p.gender = update.gender;
        }
        if update.activity_level.is_some() {
            p.activity_level = update.activity_level;
        }
        if update.daily_calorie_goal.is_some() {
            p.daily_calorie_goal = update.daily_calorie_goal;
        }
        Ok(p.clone())
    }

    async fn recommended_calories(&self) -> Result<Option<i32>, ApiError> {
        self.check("recommended_calories")?;
        Ok(self.inner.lock().unwrap().recommended)
    }

    async fn search_foods(&self, name: &str) -> Result<Vec<Food>, ApiError> {
        self.inner.lock().unwrap().searches.push(name.to_string());
        self.check("search_foods")?;
        let needle = name.to_lowercase();
        Ok(self
            .inner
            .lock()
            .unwrap()
            .foods
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn food(&self, id: i64) -> Result<Food, ApiError> {
        self.check("food")?;
        self.inner
            .lock()
            .unwrap()
            .foods
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| server_error("Food not found"))
    }

    async fn create_food(&self, food: &NewFood) -> Result<Food, ApiError> {
        self.check("create_food")?;
        let mut inner = self.inner.lock().unwrap();
        inner.created_foods.push(food.clone());
        let stored = Food {
            brand: food.brand.clone(),
            barcode: food.barcode.clone(),
            source: Some(food.source),
            calories: Some(food.calories),
            protein: food.protein,
            carbohydrates: food.carbohydrates,
            fat: food.fat,
            fiber: food.fiber,
            sodium: food.sodium,
            ..Food::named(1000 + inner.created_foods.len() as i64, food.name.clone())
        };
        inner.foods.push(stored.clone());
        Ok(stored)
    }

    async fn food_by_barcode(&self, barcode: &str) -> Result<Option<Food>, ApiError> {
        self.check("food_by_barcode")?;
        Ok(self.inner.lock().unwrap().barcodes.get(barcode).cloned())
    }

    async fn analyze_image(
        &self,
        _image: &ImageUpload,
    ) -> Result<Vec<RecognizedFoodCandidate>, ApiError> {
        self.check("analyze_image")?;
        Ok(self.inner.lock().unwrap().candidates.clone())
    }

    async fn create_meal(&self, request: &CreateMealRequest) -> Result<MealId, ApiError> {
        self.check("create_meal")?;
        let mut inner = self.inner.lock().unwrap();
        inner.created.push(request.clone());
        Ok(inner.created.len() as MealId)
    }

    async fn meal(&self, id: MealId) -> Result<Meal, ApiError> {
        self.check("meal")?;
        self.inner
            .lock()
            .unwrap()
            .meals
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| server_error("Meal not found"))
    }

    async fn meals_by_date(&self, date: Date) -> Result<Vec<Meal>, ApiError> {
        self.check("meals_by_date")?;
        Ok(self
            .inner
            .lock()
            .unwrap()
            .meals
            .iter()
            .filter(|m| m.meal_date == date)
            .cloned()
            .collect())
    }

    async fn meals_in_range(&self, start: Date, end: Date) -> Result<Vec<Meal>, ApiError> {
        self.check("meals_in_range")?;
        Ok(self
            .inner
            .lock()
            .unwrap()
            .meals
            .iter()
            .filter(|m| m.meal_date >= start && m.meal_date <= end)
            .cloned()
            .collect())
    }

    async fn delete_meal(&self, id: MealId) -> Result<(), ApiError> {
        self.check("delete_meal")?;
        let mut inner = self.inner.lock().unwrap();
        let before = inner.meals.len();
        inner.meals.retain(|m| m.id != id);
        if inner.meals.len() == before {
            return Err(ApiError::Status {
                status: 404,
                message: "Meal not found".into(),
            });
        }
        inner.deleted.push(id);
        Ok(())
    }
}
