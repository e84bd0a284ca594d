use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::error::AppError;
use crate::models::{ApiResponse, RsvpFormData, Submission};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/rsvp", post(submit_rsvp))
}

async fn submit_rsvp(
    State(state): State<AppState>,
    payload: Result<Json<RsvpFormData>, JsonRejection>,
) -> Result<Json<ApiResponse<Submission>>, AppError> {
    let Json(form) = payload?;

    let submission = state.store.submit(&form).await?;

    let message = if submission.is_update {
        "RSVP updated successfully!"
    } else {
        "RSVP submitted successfully!"
    };
    Ok(Json(ApiResponse::ok(submission).with_message(message)))
}
