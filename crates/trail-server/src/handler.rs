use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use trail_types::RecordDraft;

use crate::error::ServerError;
use crate::schema::{FlatLineageResponse, GraphResponse, HealthResponse, RecordResponse};
use crate::state::AppState;

/// `POST /v1/lineage/record` — append one transformation event.
pub async fn record_transformation(
    State(state): State<AppState>,
    Json(draft): Json<RecordDraft>,
) -> Result<(StatusCode, Json<RecordResponse>), ServerError> {
    let record = state.store.append(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordResponse {
            record_id: record.id,
            dataset_id: record.dataset_id,
        }),
    ))
}

/// `GET /v1/lineage/{dataset_id}` — the flat event list, write order.
///
/// Unknown identifiers return an empty list, not a 404: "no data recorded"
/// is a valid answer, not a malformed query.
pub async fn flat_lineage(
    State(state): State<AppState>,
    Path(dataset_id): Path<String>,
) -> Result<Json<FlatLineageResponse>, ServerError> {
    let records = state.resolver.flat_lineage(&dataset_id).await?;
    Ok(Json(FlatLineageResponse {
        dataset_id,
        records,
    }))
}

/// `GET /v1/lineage/{dataset_id}/graph` — the recursive lineage graph.
pub async fn lineage_graph(
    State(state): State<AppState>,
    Path(dataset_id): Path<String>,
) -> Result<Json<GraphResponse>, ServerError> {
    let graph = state.resolver.lineage_graph(&dataset_id).await?;
    Ok(Json(GraphResponse { dataset_id, graph }))
}

/// `GET /v1/datasets` — every distinct dataset identifier ever recorded.
pub async fn list_datasets(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ServerError> {
    Ok(Json(state.store.list_dataset_ids().await?))
}

/// `GET /v1/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}
