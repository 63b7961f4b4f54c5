use time::Date;
use tracing::{debug, error, info, instrument};

use crate::error::{ApiError, ClientError, ValidationError};
use crate::foods::services::validate_new_food;
use crate::foods::{is_valid_barcode, Food, NewFood};
use crate::images::{ImageUpload, RecognizedFoodCandidate};
use crate::meals::{MealDraft, MealId, MealType, NutrientTotals};
use crate::screens::{api_failure, ActionState, ScreenError};
use crate::state::AppState;

/// Meal entry: search or scan foods, optionally seeded by photo analysis,
/// compose them into a draft and submit it in one request.
pub struct AddMealScreen {
    state: AppState,
    pub draft: MealDraft,
    results: Vec<Food>,
    recognized: Vec<RecognizedFoodCandidate>,
    pending: Option<RecognizedFoodCandidate>,
    // catalog records of the foods in the draft, for the nutrition preview
    added: Vec<Food>,
    pub search_state: ActionState,
    pub scan_state: ActionState,
    pub analyze_state: ActionState,
    pub create_state: ActionState,
    pub submit_state: ActionState,
}

impl AddMealScreen {
    pub fn new(state: &AppState, meal_type: MealType, date: Date) -> Self {
        Self {
            state: state.clone(),
            draft: MealDraft::new(meal_type, date),
            results: Vec::new(),
            recognized: Vec::new(),
            pending: None,
            added: Vec::new(),
            search_state: ActionState::Idle,
            scan_state: ActionState::Idle,
            analyze_state: ActionState::Idle,
            create_state: ActionState::Idle,
            submit_state: ActionState::Idle,
        }
    }

    pub fn results(&self) -> &[Food] {
        &self.results
    }

    pub fn recognized(&self) -> &[RecognizedFoodCandidate] {
        &self.recognized
    }

    pub fn pending(&self) -> Option<&RecognizedFoodCandidate> {
        self.pending.as_ref()
    }

    /// Free-text search. A blank query does nothing; any other search drops
    /// the pending recognized candidate.
    pub async fn search(&mut self, query: &str) -> Result<(), ScreenError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        self.pending = None;
        self.run_search(query).await
    }

    #[instrument(skip(self))]
    async fn run_search(&mut self, query: &str) -> Result<(), ScreenError> {
        self.search_state.start();
        let result = match self.state.api.search_foods(query).await {
            Ok(foods) => {
                debug!(results = foods.len(), "search results");
                self.results = foods;
                Ok(())
            }
            Err(e) => Err(api_failure(&self.state, e, "Failed to search foods")),
        };
        self.search_state.finish(result)
    }

    #[instrument(skip(self))]
    pub async fn scan_barcode(&mut self, code: &str) -> Result<(), ScreenError> {
        self.scan_state.start();
        let result = self.try_scan(code.trim()).await;
        self.scan_state.finish(result)
    }

    async fn try_scan(&mut self, code: &str) -> Result<(), ScreenError> {
        if !is_valid_barcode(code) {
            return Err(ValidationError::InvalidBarcode.into());
        }
        self.pending = None;
        match self.state.api.food_by_barcode(code).await {
            Ok(Some(food)) => {
                self.results = vec![food];
                Ok(())
            }
            Ok(None) => Err(ScreenError::failed("Food not found for this barcode")),
            Err(e) => Err(api_failure(&self.state, e, "Failed to scan barcode")),
        }
    }

    /// Fetches one catalog food by id as the only result.
    #[instrument(skip(self))]
    pub async fn open_food(&mut self, food_id: i64) -> Result<(), ScreenError> {
        self.search_state.start();
        let result = match self.state.api.food(food_id).await {
            Ok(food) => {
                self.pending = None;
                self.results = vec![food];
                Ok(())
            }
            Err(e) => Err(api_failure(&self.state, e, "Failed to load food")),
        };
        self.search_state.finish(result)
    }

    /// Adds a user-entered food to the catalog; the stored record becomes the
    /// only result so it can be added to the draft.
    #[instrument(skip_all, fields(name = %food.name))]
    pub async fn create_food(&mut self, mut food: NewFood) -> Result<(), ScreenError> {
        self.create_state.start();
        let result = match validate_new_food(&mut food) {
            Err(e) => Err(e.into()),
            Ok(()) => match self.state.api.create_food(&food).await {
                Ok(created) => {
                    info!(food_id = created.id, "food created");
                    self.pending = None;
                    self.results = vec![created];
                    Ok(())
                }
                Err(e) => Err(api_failure(&self.state, e, "Failed to create food")),
            },
        };
        self.create_state.finish(result)
    }

    /// Sends a photo for recognition and replaces the recognized list.
    #[instrument(skip_all, fields(file = %image.file_name))]
    pub async fn analyze_image(&mut self, image: &ImageUpload) -> Result<(), ScreenError> {
        self.analyze_state.start();
        let result = match self.state.api.analyze_image(image).await {
            Ok(candidates) => {
                info!(candidates = candidates.len(), "image analyzed");
                self.recognized = candidates;
                self.pending = None;
                Ok(())
            }
            Err(e) => Err(self.analysis_failure(e)),
        };
        self.analyze_state.finish(result)
    }

    fn analysis_failure(&self, err: ApiError) -> ScreenError {
        if let ApiError::Parse(detail) = &err {
            error!(%detail, "analysis payload not understood");
            return ScreenError::failed("Image analyzed, but response format is unexpected.");
        }
        if let ApiError::Status { message, .. } = &err {
            // the analysis endpoint reports its failures as plain text
            if !message.trim().is_empty() {
                error!(error = %err, "image analysis failed");
                return ScreenError::failed(message.trim());
            }
        }
        api_failure(&self.state, err, "Failed to analyze image")
    }

    /// Searches for a recognized candidate by name and keeps it pending so
    /// its portion pre-fills the next add.
    pub async fn search_recognized(&mut self, index: usize) -> Result<(), ScreenError> {
        let candidate = self
            .recognized
            .get(index)
            .cloned()
            .ok_or(ValidationError::IndexOutOfRange {
                index,
                len: self.recognized.len(),
            })?;
        self.run_search(&candidate.food_name).await?;
        self.pending = Some(candidate);
        Ok(())
    }

    /// Adds a search result to the draft. A pending candidate's gram portion
    /// becomes the quantity and the candidate is consumed.
    pub fn add_result(&mut self, index: usize) -> Result<(), ScreenError> {
        let food = self
            .results
            .get(index)
            .cloned()
            .ok_or(ValidationError::IndexOutOfRange {
                index,
                len: self.results.len(),
            })?;
        let portion = self
            .pending
            .as_ref()
            .and_then(RecognizedFoodCandidate::portion_grams);
        self.draft.foods.add(&food, portion)?;
        if let Some(candidate) = self.pending.take() {
            self.recognized.retain(|c| *c != candidate);
        }
        self.added.push(food);
        Ok(())
    }

    pub fn update_quantity(&mut self, index: usize, grams: f64) -> Result<(), ScreenError> {
        Ok(self.draft.foods.update_quantity(index, grams)?)
    }

    pub fn update_servings(&mut self, index: usize, servings: f64) -> Result<(), ScreenError> {
        Ok(self.draft.foods.update_servings(index, servings)?)
    }

    pub fn remove(&mut self, index: usize) -> Result<(), ScreenError> {
        let entry = self.draft.foods.remove(index)?;
        self.added.retain(|f| f.id != entry.food_id);
        Ok(())
    }

    pub fn preview(&self) -> NutrientTotals {
        self.draft.foods.preview(&self.added)
    }

    /// Creates the meal. On success the screen starts a fresh draft for the
    /// same type and date.
    pub async fn submit(&mut self) -> Result<MealId, ScreenError> {
        self.submit_state.start();
        let result = match self.draft.submit(self.state.api.as_ref()).await {
            Ok(id) => {
                self.reset();
                Ok(id)
            }
            Err(ClientError::Validation(e)) => Err(e.into()),
            Err(ClientError::Api(e)) => Err(api_failure(&self.state, e, "Failed to create meal")),
        };
        self.submit_state.finish(result)
    }

    fn reset(&mut self) {
        self.draft = MealDraft::new(self.draft.meal_type, self.draft.meal_date);
        self.results.clear();
        self.recognized.clear();
        self.pending = None;
        self.added.clear();
    }
}
