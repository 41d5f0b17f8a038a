//! Survey response API handlers
//!
//! Submission, listing with statistics, and clearing of the survey store.

use crate::error::AppError;
use crate::state::SharedState;
use crate::survey::stats::{self, ScoreStats, RECENT_LIMIT};
use crate::survey::{validate_answers, SurveyRecord};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header carrying the admin secret for clearing the store
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Submit request
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Answer mapping; validated key by key
    pub answers: Option<Value>,
}

/// Submit response
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// Always `true`
    pub ok: bool,
    /// The stored record
    pub record: SurveyRecord,
}

/// Listing response
#[derive(Debug, Serialize)]
pub struct ResponsesListing {
    /// Total number of stored records
    pub count: usize,
    /// Mean of each derived score across all records
    pub stats: ScoreStats,
    /// Most recent records, oldest first
    pub responses: Vec<SurveyRecord>,
}

/// Acknowledgement response
#[derive(Debug, Serialize)]
pub struct OkResponse {
    /// Always `true`
    pub ok: bool,
}

/// POST /api/submit - Validate, score and store one survey response
pub async fn submit_response(
    State(state): State<SharedState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(AppError::PayloadTooLarge);
        }
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Submit body rejected");
            return Err(AppError::MissingAnswers);
        }
    };

    // Only an object can hold answers; `null`, `false`, `0`, `""` and the like count as absent
    let answers = request
        .answers
        .filter(Value::is_object)
        .ok_or(AppError::MissingAnswers)?;
    let answers = validate_answers(&answers).inspect_err(|e| {
        tracing::debug!(key = e.key(), error = %e, "Submission failed validation");
    })?;

    let record = state.survey.submit(answers).await?;
    Ok(Json(SubmitResponse { ok: true, record }))
}

/// GET /api/responses - Record count, score means and the most recent records
pub async fn list_responses(
    State(state): State<SharedState>,
) -> Result<Json<ResponsesListing>, AppError> {
    let records = state.survey.records().await;

    Ok(Json(ResponsesListing {
        count: records.len(),
        stats: stats::summarize(&records),
        responses: stats::recent(&records, RECENT_LIMIT).to_vec(),
    }))
}

/// DELETE /api/responses - Remove every record (requires the admin token)
pub async fn clear_responses(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<OkResponse>, AppError> {
    authorize_admin(state.admin_token.as_deref(), &headers)?;
    state.survey.clear().await?;
    Ok(Json(OkResponse { ok: true }))
}

/// Check the admin header against the configured secret
///
/// # Returns
/// * `Err(AppError::AdminDisabled)` - No secret is configured
/// * `Err(AppError::Unauthorized)` - Header absent or different from the secret
fn authorize_admin(expected: Option<&str>, headers: &HeaderMap) -> Result<(), AppError> {
    let expected = expected.ok_or(AppError::AdminDisabled)?;
    let provided = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(expected) {
        tracing::warn!(header_present = provided.is_some(), "Rejected store clear request");
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
