//! Command handlers behind each screen. Every handler updates explicit view
//! state and returns a `Result`; nothing is cached across screens.

pub mod add_meal;
pub mod dashboard;
pub mod login;
pub mod profile;
pub mod register;
pub mod status;

use thiserror::Error;
use tracing::{error, warn};

use crate::error::{ApiError, ValidationError};
use crate::state::AppState;

pub use add_meal::AddMealScreen;
pub use dashboard::{DashboardScreen, GoalProgress};
pub use login::LoginScreen;
pub use profile::ProfileScreen;
pub use register::RegisterScreen;
pub use status::ActionState;

pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// What a screen shows when an action fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScreenError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Your session has expired. Please log in again.")]
    SessionExpired,

    #[error("{0}")]
    Failed(String),
}

impl ScreenError {
    pub fn failed(msg: impl Into<String>) -> Self {
        ScreenError::Failed(msg.into())
    }
}

/// Maps a backend failure on an authenticated screen. A rejected token is
/// dropped from the store so the next command starts signed out.
pub(crate) fn api_failure(state: &AppState, err: ApiError, fallback: &str) -> ScreenError {
    if err.is_auth_failure() {
        warn!(status = ?err.status(), "session rejected; clearing stored token");
        if let Err(e) = state.credentials.clear() {
            error!(error = %e, "failed to clear stored token");
        }
        return ScreenError::SessionExpired;
    }
    error!(error = %err, "{fallback}");
    ScreenError::failed(fallback)
}
