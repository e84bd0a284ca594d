pub mod cache;
pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod routes;
pub mod sheets;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    set_header::SetResponseHeaderLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::models::EventInfo;
use crate::store::GuestStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<GuestStore>,
    pub event: Arc<EventInfo>,
    /// Configuration format problems reported by `/health`.
    pub config_warnings: Arc<Vec<String>>,
}

/// Build the full Axum application router.
///
/// Responses are never cacheable: lookups reflect live RSVP state.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::guests::router())
        .merge(routes::rsvp::router())
        .merge(routes::health::router())
        .merge(routes::logs::router())
        .merge(routes::event::router())
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                )),
        )
        .with_state(state)
}
