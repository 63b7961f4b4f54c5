use std::sync::Arc;

use crate::api::{HttpApi, NutritionApi};
use crate::config::AppConfig;
use crate::storage::{CredentialStore, FileCredentials};

/// Everything a screen needs, built once and passed explicitly.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: Arc<dyn NutritionApi>,
    pub credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let credentials =
            Arc::new(FileCredentials::new(&config.token_path)) as Arc<dyn CredentialStore>;
        let api = Arc::new(HttpApi::new(&config, credentials.clone())?) as Arc<dyn NutritionApi>;
        Ok(Self {
            config,
            api,
            credentials,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        api: Arc<dyn NutritionApi>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            config,
            api,
            credentials,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.credentials.token().is_some()
    }

    /// State over a canned backend with a signed-in in-memory credential.
    #[cfg(test)]
    pub fn fake(api: Arc<crate::testing::FakeApi>) -> Self {
        use crate::storage::MemoryCredentials;

        let config = Arc::new(AppConfig::with_base_url("http://fake.local/api"));
        let credentials =
            Arc::new(MemoryCredentials::with_token("fake-token")) as Arc<dyn CredentialStore>;
        Self::from_parts(config, api as Arc<dyn NutritionApi>, credentials)
    }
}
