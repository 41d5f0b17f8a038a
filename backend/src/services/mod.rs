//! Service layer
//!
//! Business logic sitting between the HTTP handlers and storage.

pub mod survey;

pub use survey::SurveyService;
