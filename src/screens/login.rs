use tracing::{error, info, instrument, warn};

use crate::auth::services::login_request;
use crate::auth::AuthResponse;
use crate::screens::{ActionState, ScreenError};
use crate::state::AppState;

pub struct LoginScreen {
    state: AppState,
    pub action: ActionState,
    session: Option<AuthResponse>,
}

impl LoginScreen {
    pub fn new(state: &AppState) -> Self {
        Self {
            state: state.clone(),
            action: ActionState::Idle,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&AuthResponse> {
        self.session.as_ref()
    }

    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ScreenError> {
        self.action.start();
        let result = self.try_login(username, password).await;
        self.action.finish(result)
    }

    async fn try_login(&mut self, username: &str, password: &str) -> Result<(), ScreenError> {
        let request = login_request(username, password)?;
        let resp = match self.state.api.login(&request).await {
            Ok(r) => r,
            // a 401/403 here is a credentials problem, not an expired session
            Err(e) if e.is_auth_failure() => {
                warn!(username = %request.username, "login rejected");
                return Err(ScreenError::failed("Invalid username or password"));
            }
            Err(e) => {
                error!(error = %e, "login failed");
                return Err(ScreenError::failed(
                    e.server_message()
                        .unwrap_or("Login failed. Please try again."),
                ));
            }
        };
        store_token(&self.state, &resp.token)?;
        info!(username = %resp.username, "logged in");
        self.session = Some(resp);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), ScreenError> {
        self.session = None;
        self.state.credentials.clear().map_err(|e| {
            error!(error = %e, "failed to clear stored token");
            ScreenError::failed("Logout failed")
        })?;
        info!("logged out");
        Ok(())
    }
}

pub(crate) fn store_token(state: &AppState, token: &str) -> Result<(), ScreenError> {
    state.credentials.save(token).map_err(|e| {
        error!(error = %e, "failed to store token");
        ScreenError::failed("Could not save the session token")
    })
}
