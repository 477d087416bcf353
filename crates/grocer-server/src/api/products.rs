use axum::{
    extract::{Path, State},
    Extension, Json,
};
use grocer_pipeline::{AllProductsResponse, LocationProductsResponse, SiteProductsResponse};

use crate::middleware::RequestId;

use super::{map_query_error, ApiError, AppState};

pub(super) async fn all_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<AllProductsResponse>, ApiError> {
    state
        .service
        .all_products()
        .await
        .map(Json)
        .map_err(|e| map_query_error(req_id.0, &e))
}

pub(super) async fn products_by_site(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(site): Path<String>,
) -> Result<Json<SiteProductsResponse>, ApiError> {
    state
        .service
        .products_by_site(&site)
        .await
        .map(Json)
        .map_err(|e| map_query_error(req_id.0, &e))
}

pub(super) async fn products_by_site_and_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((site, location)): Path<(String, String)>,
) -> Result<Json<LocationProductsResponse>, ApiError> {
    state
        .service
        .products_by_site_and_location(&site, &location)
        .await
        .map(Json)
        .map_err(|e| map_query_error(req_id.0, &e))
}
