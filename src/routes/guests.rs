use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{ApiResponse, GuestEntry};
use crate::store::StoreError;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionStatus {
    pub submitted: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/codes/{code}", get(lookup_code))
        .route("/codes/{code}/status", get(submission_status))
}

async fn lookup_code(
    State(state): State<AppState>,
    code: Result<Path<String>, PathRejection>,
) -> Result<Json<ApiResponse<GuestEntry>>, AppError> {
    let Path(code) = code?;
    let entry = state.store.lookup(&code).await?.ok_or(StoreError::NotFound)?;

    Ok(Json(
        ApiResponse::ok(entry).with_message("Invitation code validated successfully"),
    ))
}

async fn submission_status(
    State(state): State<AppState>,
    code: Result<Path<String>, PathRejection>,
) -> Result<Json<ApiResponse<SubmissionStatus>>, AppError> {
    let Path(code) = code?;
    let submitted = state.store.is_already_submitted(&code).await?;
    Ok(Json(ApiResponse::ok(SubmissionStatus { submitted })))
}
