use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use grocer_pipeline::ScrapeResponse;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_query_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeRequest {
    location: String,
    product: String,
}

/// Runs a full scrape. Blocks until the external scraper and parser finish.
pub(super) async fn scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let Json(body) = body
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    tracing::info!(
        request_id = %req_id.0,
        product = %body.product,
        location = %body.location,
        "scrape requested"
    );

    state
        .service
        .scrape(&body.product, &body.location)
        .await
        .map(Json)
        .map_err(|e| map_query_error(req_id.0, &e))
}
