use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::models::{CheckResult, HealthChecks, HealthReport, HealthState};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let sheets = state.store.health_check().await;

    let configuration = if state.config_warnings.is_empty() {
        CheckResult::healthy("Required configuration present")
    } else {
        CheckResult::degraded(state.config_warnings.join("; "))
    };

    let report = HealthReport::from_checks(HealthChecks {
        sheets,
        configuration,
    });

    let status = match report.status {
        HealthState::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthState::Healthy | HealthState::Degraded => StatusCode::OK,
    };
    (status, Json(report))
}
