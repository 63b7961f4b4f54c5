use crate::screens::ScreenError;

/// Lifecycle of one user action. A new call while `Loading` just starts over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl ActionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ActionState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ActionState::Error(msg) => Some(msg.as_str()),
            _ => None,
        }
    }

    pub fn start(&mut self) {
        *self = ActionState::Loading;
    }

    /// Records the outcome and hands the result back.
    pub fn finish<T>(&mut self, result: Result<T, ScreenError>) -> Result<T, ScreenError> {
        *self = match &result {
            Ok(_) => ActionState::Success,
            Err(e) => ActionState::Error(e.to_string()),
        };
        result
    }
}
