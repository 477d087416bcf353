use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    Extension, Json,
};
use grocer_pipeline::{ParseResponse, UploadResponse};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_query_error, ApiError, AppState};

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub(super) struct ParseRequest {
    file_path: String,
}

pub(super) async fn parse_file(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ParseResponse>, ApiError> {
    let Json(body) = body
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    state
        .service
        .parse_file(&body.file_path)
        .await
        .map(Json)
        .map_err(|e| map_query_error(req_id.0, &e))
}

/// Accepts a multipart form with one `file` field holding an HTML page.
pub(super) async fn upload_file(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart =
        multipart.map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&req_id, &e))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        // Checked again by the service; rejecting here skips buffering the body.
        let filename = field.file_name().unwrap_or_default().to_string();
        if !filename.ends_with(".html") {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "File must be an HTML file",
            ));
        }

        let bytes = field.bytes().await.map_err(|e| multipart_error(&req_id, &e))?;
        return state
            .service
            .upload_and_parse(&filename, &bytes)
            .await
            .map(Json)
            .map_err(|e| map_query_error(req_id.0, &e));
    }

    Err(ApiError::new(
        req_id.0,
        "validation_error",
        "missing multipart field `file`",
    ))
}

fn multipart_error(req_id: &RequestId, error: &MultipartError) -> ApiError {
    let code = if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        "payload_too_large"
    } else {
        "bad_request"
    };
    ApiError::new(req_id.0.clone(), code, error.body_text())
}
