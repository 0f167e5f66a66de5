pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessment::handlers as assessment;
use crate::impact::handlers as impact;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessment API
        .route("/api/v1/assessment", post(assessment::handle_assess))
        // Citation impact API
        .route("/api/v1/works/lookup", get(impact::handle_lookup))
        .route(
            "/api/v1/works/:work_id/citing-countries",
            get(impact::handle_citing_countries),
        )
        .route(
            "/api/v1/works/:work_id/second-order",
            get(impact::handle_second_order),
        )
        .with_state(state)
}
