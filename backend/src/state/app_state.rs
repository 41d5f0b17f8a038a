// Application state shared by all request handlers

use crate::config::Config;
use crate::services::SurveyService;
use crate::state::persistence::{JsonFileStore, SurveyStore};
use std::sync::Arc;

/// Handle to the application state as held by the router
pub type SharedState = Arc<AppState>;

/// Main application state
pub struct AppState {
    /// Survey store service
    pub survey: SurveyService,
    /// Secret required to clear the store; `None` disables clearing
    pub admin_token: Option<String>,
}

impl AppState {
    /// Create application state over an arbitrary store
    pub fn new(store: Arc<dyn SurveyStore>, admin_token: Option<String>) -> Self {
        Self {
            survey: SurveyService::new(store),
            admin_token,
        }
    }

    /// Create application state backed by the JSON file store in the configured data directory
    pub fn from_config(config: &Config) -> Self {
        let store = JsonFileStore::new(config.persistence.responses_path());
        Self::new(Arc::new(store), config.security.admin_token.clone())
    }

    /// Wrap into the shared handle used by the router
    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}
