// State management module
// Handles shared application state and survey store persistence

pub mod app_state;
pub mod persistence;

pub use app_state::{AppState, SharedState};
pub use persistence::{JsonFileStore, MemoryStore, PersistenceError, SurveyStore};
