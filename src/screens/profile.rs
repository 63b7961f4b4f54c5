use tracing::{debug, info, instrument};

use crate::screens::{api_failure, ActionState, ScreenError};
use crate::state::AppState;
use crate::users::services::validate_update;
use crate::users::{ProfileUpdate, UserProfile};

pub struct ProfileScreen {
    state: AppState,
    profile: Option<UserProfile>,
    recommended: Option<i32>,
    pub load_state: ActionState,
    pub save_state: ActionState,
    pub recommend_state: ActionState,
}

impl ProfileScreen {
    pub fn new(state: &AppState) -> Self {
        Self {
            state: state.clone(),
            profile: None,
            recommended: None,
            load_state: ActionState::Idle,
            save_state: ActionState::Idle,
            recommend_state: ActionState::Idle,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Last fetched recommendation; `None` until the profile has age, weight,
    /// height, gender and activity level.
    pub fn recommended(&self) -> Option<i32> {
        self.recommended
    }

    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<(), ScreenError> {
        self.load_state.start();
        let result = match self.state.api.profile().await {
            Ok(p) => {
                self.profile = Some(p);
                Ok(())
            }
            Err(e) => Err(api_failure(&self.state, e, "Failed to load profile")),
        };
        self.load_state.finish(result)
    }

    /// Sends only the fields set in `update` and replaces the shown profile
    /// with the backend's answer.
    #[instrument(skip(self))]
    pub async fn save(&mut self, update: &ProfileUpdate) -> Result<(), ScreenError> {
        self.save_state.start();
        let result = self.try_save(update).await;
        self.save_state.finish(result)
    }

    async fn try_save(&mut self, update: &ProfileUpdate) -> Result<(), ScreenError> {
        validate_update(update)?;
        if update.is_empty() {
            debug!("nothing to update");
            return Ok(());
        }
        match self.state.api.update_profile(update).await {
            Ok(p) => {
                info!("profile updated");
                self.profile = Some(p);
                Ok(())
            }
            Err(e) => Err(api_failure(&self.state, e, "Failed to update profile")),
        }
    }

    #[instrument(skip(self))]
    pub async fn recommend(&mut self) -> Result<Option<i32>, ScreenError> {
        self.recommend_state.start();
        let result = match self.state.api.recommended_calories().await {
            Ok(kcal) => {
                self.recommended = kcal;
                Ok(kcal)
            }
            Err(e) => Err(api_failure(
                &self.state,
                e,
                "Failed to load recommended calories",
            )),
        };
        self.recommend_state.finish(result)
    }
}
