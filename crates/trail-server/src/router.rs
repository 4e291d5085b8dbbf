use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all datatrail endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/lineage/record", post(handler::record_transformation))
        .route("/v1/lineage/:dataset_id", get(handler::flat_lineage))
        .route("/v1/lineage/:dataset_id/graph", get(handler::lineage_graph))
        .route("/v1/datasets", get(handler::list_datasets))
        .route("/v1/health", get(handler::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
