use tracing::{error, info, instrument};

use crate::auth::services::register_request;
use crate::auth::AuthResponse;
use crate::screens::login::store_token;
use crate::screens::{ActionState, ScreenError};
use crate::state::AppState;

pub struct RegisterScreen {
    state: AppState,
    pub action: ActionState,
    session: Option<AuthResponse>,
}

impl RegisterScreen {
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

    #[instrument(skip(self, email, password, full_name))]
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<(), ScreenError> {
        self.action.start();
        let result = self.try_register(username, email, password, full_name).await;
        self.action.finish(result)
    }

    async fn try_register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<(), ScreenError> {
        let request = register_request(username, email, password, full_name)?;
        let resp = self.state.api.register(&request).await.map_err(|e| {
            error!(error = %e, "registration failed");
            ScreenError::failed(
                e.server_message()
                    .unwrap_or("Registration failed. Please try again."),
            )
        })?;
        store_token(&self.state, &resp.token)?;
        info!(username = %resp.username, "registered");
        self.session = Some(resp);
        Ok(())
    }
}
