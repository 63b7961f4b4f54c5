use std::collections::BTreeMap;

use time::Date;
use tracing::{debug, info, instrument, warn};

use crate::error::ValidationError;
use crate::meals::dto::format_date;
use crate::meals::{aggregate, totals_by_day, DayTotals, Meal, MealId};
use crate::screens::{api_failure, ActionState, ScreenError};
use crate::state::AppState;

/// Calories eaten against the profile's daily goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    pub goal: i32,
    pub consumed: f64,
    pub remaining: f64,
    pub percent: f64,
}

pub struct DashboardScreen {
    state: AppState,
    date: Date,
    meals: Vec<Meal>,
    totals: DayTotals,
    calorie_goal: Option<i32>,
    history: BTreeMap<Date, DayTotals>,
    selected: Option<Meal>,
    pub load_state: ActionState,
    pub delete_state: ActionState,
    pub history_state: ActionState,
    pub meal_state: ActionState,
}

impl DashboardScreen {
    pub fn new(state: &AppState, date: Date) -> Self {
        Self {
            state: state.clone(),
            date,
            meals: Vec::new(),
            totals: DayTotals::default(),
            calorie_goal: None,
            history: BTreeMap::new(),
            selected: None,
            load_state: ActionState::Idle,
            delete_state: ActionState::Idle,
            history_state: ActionState::Idle,
            meal_state: ActionState::Idle,
        }
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn totals(&self) -> &DayTotals {
        &self.totals
    }

    pub fn history(&self) -> &BTreeMap<Date, DayTotals> {
        &self.history
    }

    /// The meal opened with [`DashboardScreen::open_meal`].
    pub fn selected(&self) -> Option<&Meal> {
        self.selected.as_ref()
    }

    /// Fetches the day's meals and replaces the list and its totals.
    #[instrument(skip(self), fields(date = %format_date(date)))]
    pub async fn load(&mut self, date: Date) -> Result<(), ScreenError> {
        self.date = date;
        self.load_state.start();
        let result = match self.state.api.meals_by_date(date).await {
            Ok(meals) => {
                self.totals = aggregate(&meals);
                self.meals = meals;
                debug!(meals = self.meals.len(), "meals loaded");
                self.refresh_goal().await
            }
            Err(e) => Err(api_failure(&self.state, e, "Failed to load meals")),
        };
        self.load_state.finish(result)
    }

    /// Only a rejected session fails the load; without a goal the day still renders.
    async fn refresh_goal(&mut self) -> Result<(), ScreenError> {
        match self.state.api.profile().await {
            Ok(p) => self.calorie_goal = p.daily_calorie_goal,
            Err(e) if e.is_auth_failure() => {
                return Err(api_failure(&self.state, e, "Failed to load profile"));
            }
            Err(e) => warn!(error = %e, "could not load calorie goal"),
        }
        Ok(())
    }

    /// Deletes a meal, then re-fetches the selected date.
    #[instrument(skip(self))]
    pub async fn delete(&mut self, meal_id: MealId) -> Result<(), ScreenError> {
        self.delete_state.start();
        let deleted = match self.state.api.delete_meal(meal_id).await {
            Ok(()) => {
                info!(meal_id, "meal deleted");
                Ok(())
            }
            Err(e) => Err(api_failure(&self.state, e, "Failed to delete meal")),
        };
        self.delete_state.finish(deleted)?;
        self.load(self.date).await
    }

    /// Fetches one meal with its food lines, independent of the selected date.
    #[instrument(skip(self))]
    pub async fn open_meal(&mut self, meal_id: MealId) -> Result<(), ScreenError> {
        self.meal_state.start();
        let result = match self.state.api.meal(meal_id).await {
            Ok(meal) => {
                self.selected = Some(meal);
                Ok(())
            }
            Err(e) => Err(api_failure(&self.state, e, "Failed to load meal")),
        };
        self.meal_state.finish(result)
    }

    #[instrument(skip(self), fields(start = %format_date(start), end = %format_date(end)))]
    pub async fn load_range(&mut self, start: Date, end: Date) -> Result<(), ScreenError> {
        self.history_state.start();
        let result = if start > end {
            Err(ValidationError::InvertedRange.into())
        } else {
            match self.state.api.meals_in_range(start, end).await {
                Ok(meals) => {
                    self.history = totals_by_day(&meals);
                    Ok(())
                }
                Err(e) => Err(api_failure(&self.state, e, "Failed to load meal history")),
            }
        };
        self.history_state.finish(result)
    }

    pub fn goal_progress(&self) -> Option<GoalProgress> {
        let goal = self.calorie_goal.filter(|g| *g > 0)?;
        let consumed = self.totals.day.calories;
        Some(GoalProgress {
            goal,
            consumed,
            remaining: f64::from(goal) - consumed,
            percent: consumed * 100.0 / f64::from(goal),
        })
    }
}
