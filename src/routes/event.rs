use axum::{extract::State, routing::get, Json, Router};

use crate::models::{ApiResponse, EventInfo};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/event", get(event_info))
}

async fn event_info(State(state): State<AppState>) -> Json<ApiResponse<EventInfo>> {
    Json(ApiResponse::ok(state.event.as_ref().clone()))
}
