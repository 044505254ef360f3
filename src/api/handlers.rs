use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::error::FailureKind;
use crate::ndvi::NdviStats;
use crate::pipeline::{NdviPipeline, PipelineFailure};
use super::models::*;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<NdviPipeline>,
}

impl AppState {
    pub fn new(pipeline: NdviPipeline) -> Self {
        Self { pipeline: Arc::new(pipeline) }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::InvalidInput => StatusCode::BAD_REQUEST,
        FailureKind::UpstreamDataError | FailureKind::ComputationError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn failure_response(failure: &PipelineFailure) -> ApiError {
    (
        status_for(failure.kind),
        Json(ErrorResponse {
            detail: failure.detail(),
            kind: failure.kind.code().to_string(),
        }),
    )
}

pub async fn query_sentinel2(
    State(state): State<AppState>,
    payload: Result<Json<Sentinel2Query>, JsonRejection>,
) -> Result<Json<NdviStats>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                detail: format!("Invalid request body: {}", rejection.body_text()),
                kind: FailureKind::InvalidInput.code().to_string(),
            }),
        )
    })?;

    let start = Instant::now();
    let result = state.pipeline.run(&req.timestamp, &req.geojson_polygon).await;
    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        ok = result.is_ok(),
        "NDVI query finished"
    );

    result.map(Json).map_err(|failure| failure_response(&failure))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.pipeline.catalog_config();
    Json(HealthResponse {
        status: "ok".to_string(),
        collection: config.collection.clone(),
        catalog_url: config.url.clone(),
    })
}
