//! CSV export handler

use crate::state::SharedState;
use crate::survey::csv::{self, CSV_CONTENT_TYPE, EXPORT_FILENAME};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

/// GET /api/export.csv - Download every record as CSV
pub async fn export_csv(State(state): State<SharedState>) -> Response {
    let records = state.survey.records().await;
    let body = csv::export(&records);
    tracing::debug!(rows = records.len(), "CSV export generated");

    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        body,
    )
        .into_response()
}
