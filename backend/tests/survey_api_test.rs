//! Integration tests for the survey API
//!
//! These tests drive the handlers against a real JSON file store and verify:
//! 1. Submission scoring and persistence
//! 2. Listing statistics and ordering
//! 3. CSV export round-trip
//! 4. Store clearing and its authorization rules
//! 5. Failure reporting when the store cannot be written

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use survey_backend::api::export::export_csv;
use survey_backend::api::responses::{
    clear_responses, list_responses, submit_response, SubmitRequest, ADMIN_TOKEN_HEADER,
};
use survey_backend::state::{
    AppState, JsonFileStore, PersistenceError, SharedState, SurveyStore,
};
use survey_backend::survey::{SurveyRecord, ITEM_KEYS, SCORE_KEYS, TIMESTAMP_KEY};
use tempfile::TempDir;

/// Helper to create state backed by a JSON file in a fresh temp directory
fn create_file_state(admin_token: Option<&str>) -> (SharedState, JsonFileStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::in_dir(dir.path().join("data"));
    let state = AppState::new(Arc::new(store.clone()), admin_token.map(str::to_string)).shared();
    (state, store, dir)
}

/// Answers with one value per category prefix
fn answers_by_category(ok: u8, ph: u8, kd: u8, te: u8) -> Value {
    let map: Map<String, Value> = ITEM_KEYS
        .iter()
        .map(|key| {
            let value = match &key[..2] {
                "OK" => ok,
                "PH" => ph,
                "KD" => kd,
                _ => te,
            };
            (key.to_string(), json!(value))
        })
        .collect();
    Value::Object(map)
}

async fn submit(state: &SharedState, answers: Value) -> SurveyRecord {
    let Json(response) = submit_response(
        State(state.clone()),
        Ok(Json(SubmitRequest {
            answers: Some(answers),
        })),
    )
    .await
    .unwrap();
    assert!(response.ok);
    response.record
}

fn admin_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ADMIN_TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
    headers
}

/// Minimal parser for the fully-quoted CSV produced by the export
fn parse_quoted_csv(text: &str) -> Vec<Vec<String>> {
    text.split('\n')
        .map(|line| {
            let mut fields = Vec::new();
            let mut field = String::new();
            let mut chars = line.chars().peekable();
            let mut in_quotes = false;
            while let Some(c) = chars.next() {
                match (c, in_quotes) {
                    ('"', true) if chars.peek() == Some(&'"') => {
                        field.push('"');
                        chars.next();
                    }
                    ('"', _) => in_quotes = !in_quotes,
                    (',', false) => fields.push(std::mem::take(&mut field)),
                    (c, _) => field.push(c),
                }
            }
            fields.push(field);
            fields
        })
        .collect()
}

#[tokio::test]
async fn test_submit_scores_and_persists() {
    let (state, store, _dir) = create_file_state(None);

    let record = submit(&state, answers_by_category(5, 1, 3, 3)).await;
    let scores = record.scores();
    assert_eq!(scores.get("OK_Ort"), Some(5.0));
    assert_eq!(scores.get("PH_Ort"), Some(1.0));
    assert_eq!(scores.get("KD_Ort"), Some(3.0));
    assert_eq!(scores.get("TE_Ort"), Some(3.0));
    assert_eq!(scores.get("Genel_Ort"), Some(3.0));

    // The file on disk holds the same record
    assert!(store.path().exists());
    let persisted: Vec<SurveyRecord> =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(persisted, vec![record]);
}

#[tokio::test]
async fn test_submit_then_list_appends_last() {
    let (state, _store, _dir) = create_file_state(None);
    submit(&state, answers_by_category(3, 3, 3, 3)).await;

    let before = list_responses(State(state.clone())).await.unwrap();
    let record = submit(&state, answers_by_category(4, 2, 5, 1)).await;
    let after = list_responses(State(state)).await.unwrap();

    assert_eq!(after.count, before.count + 1);
    assert_eq!(after.responses.last(), Some(&record));
    // Both records have an overall score of 3.0
    assert_eq!(after.stats.overall, Some(3.0));
    assert_eq!(after.stats.ok, Some(3.5));
    assert_eq!(after.stats.te, Some(2.0));
}

#[tokio::test]
async fn test_list_serializes_expected_shape() {
    let (state, _store, _dir) = create_file_state(None);
    let empty = serde_json::to_value(&*list_responses(State(state.clone())).await.unwrap()).unwrap();
    assert_eq!(empty["count"], json!(0));
    for key in SCORE_KEYS {
        assert_eq!(empty["stats"][key], Value::Null, "stat {key}");
    }

    submit(&state, answers_by_category(2, 2, 2, 2)).await;
    let listing = serde_json::to_value(&*list_responses(State(state)).await.unwrap()).unwrap();
    assert_eq!(listing["stats"]["Genel_Ort"], json!(2.0));
    let first = &listing["responses"][0];
    assert_eq!(first["OK1"], json!(2));
    assert!(first[TIMESTAMP_KEY].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_csv_round_trip() {
    let (state, _store, _dir) = create_file_state(None);
    let first = submit(&state, answers_by_category(5, 1, 3, 3)).await;
    let second = submit(&state, answers_by_category(2, 4, 4, 5)).await;

    let response = export_csv(State(state)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let rows = parse_quoted_csv(std::str::from_utf8(&body).unwrap());

    let header: Vec<&str> = std::iter::once(TIMESTAMP_KEY)
        .chain(ITEM_KEYS)
        .chain(SCORE_KEYS)
        .collect();
    assert_eq!(rows[0], header);
    assert_eq!(rows.len(), 3);

    for (row, record) in rows[1..].iter().zip([&first, &second]) {
        for (column, value) in header.iter().zip(row) {
            assert_eq!(Some(value.clone()), record.field(column), "column {column}");
        }
    }
}

#[tokio::test]
async fn test_clear_authorization_flow() {
    let (state, _store, _dir) = create_file_state(None);
    let response = clear_responses(State(state), admin_headers("anything"))
        .await
        .unwrap_err()
        .into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (state, store, _dir) = create_file_state(Some("let-me-in"));
    submit(&state, answers_by_category(1, 1, 1, 1)).await;

    let response = clear_responses(State(state.clone()), admin_headers("wrong"))
        .await
        .unwrap_err()
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.load_all().await.len(), 1);

    clear_responses(State(state.clone()), admin_headers("let-me-in"))
        .await
        .unwrap();
    let listing = list_responses(State(state)).await.unwrap();
    assert_eq!(listing.count, 0);
    assert!(store.load_all().await.is_empty());
}

#[tokio::test]
async fn test_missing_and_invalid_answers_are_rejected() {
    let (state, _store, _dir) = create_file_state(None);

    let mut body = answers_by_category(3, 3, 3, 3);
    body.as_object_mut().unwrap().remove("KD5");
    let err = submit_response(
        State(state.clone()),
        Ok(Json(SubmitRequest { answers: Some(body) })),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "missing answer: KD5");
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

    for bad in [json!(0), json!(6), json!("three")] {
        let mut body = answers_by_category(3, 3, 3, 3);
        body["OK2"] = bad;
        let err = submit_response(
            State(state.clone()),
            Ok(Json(SubmitRequest { answers: Some(body) })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid value (1-5): OK2");
    }

    let listing = list_responses(State(state)).await.unwrap();
    assert_eq!(listing.count, 0);
}

#[tokio::test]
async fn test_corrupt_store_reads_as_empty_and_recovers() {
    let (state, store, _dir) = create_file_state(None);
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), "[{\"broken\": ").unwrap();

    let listing = list_responses(State(state.clone())).await.unwrap();
    assert_eq!(listing.count, 0);

    submit(&state, answers_by_category(4, 4, 4, 4)).await;
    assert_eq!(store.load_all().await.len(), 1);

    // The corrupt content was kept next to the store
    let backups: Vec<_> = std::fs::read_dir(store.path().parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "bak"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(std::fs::read_to_string(&backups[0]).unwrap(), "[{\"broken\": ");
}

#[tokio::test]
async fn test_legacy_store_survives_new_submission() {
    let (state, store, _dir) = create_file_state(None);
    let mut first = answers_by_category(3, 3, 3, 3);
    first["OK1"] = json!("2.5");
    first[TIMESTAMP_KEY] = json!("2024-05-01T08:00:00.000Z");
    first["OK_Ort"] = json!(2.9);
    let mut second = answers_by_category(4, 4, 4, 4);
    second[TIMESTAMP_KEY] = json!("2024-05-02T09:30:00.000Z");
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), json!([first, second]).to_string()).unwrap();

    let before = list_responses(State(state.clone())).await.unwrap();
    assert_eq!(before.count, 2);
    assert_eq!(before.responses[0].scores().get("OK_Ort"), Some(2.9));

    submit(&state, answers_by_category(5, 5, 5, 5)).await;

    let on_disk: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(on_disk.len(), 3);
    assert_eq!(on_disk[0]["OK1"], json!(2.5));
    assert_eq!(on_disk[1][TIMESTAMP_KEY], json!("2024-05-02T09:30:00.000Z"));
}

/// Store whose writes always fail
struct ReadOnlyStore;

#[async_trait]
impl SurveyStore for ReadOnlyStore {
    async fn load_all(&self) -> Vec<SurveyRecord> {
        Vec::new()
    }

    async fn save_all(&self, _records: &[SurveyRecord]) -> Result<(), PersistenceError> {
        Err(PersistenceError::Io {
            path: "read-only".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only store"),
        })
    }
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let state = AppState::new(Arc::new(ReadOnlyStore), Some("token".to_string())).shared();

    let err = submit_response(
        State(state.clone()),
        Ok(Json(SubmitRequest {
            answers: Some(answers_by_category(3, 3, 3, 3)),
        })),
    )
    .await
    .unwrap_err();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"internal server error");

    let response = clear_responses(State(state), admin_headers("token"))
        .await
        .unwrap_err()
        .into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_concurrent_submissions_all_persist() {
    let (state, store, _dir) = create_file_state(None);

    let handles: Vec<_> = (0..20u8)
        .map(|i| {
            let state = state.clone();
            tokio::spawn(async move {
                let v = i % 5 + 1;
                submit(&state, answers_by_category(v, v, v, v)).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.load_all().await.len(), 20);
}
