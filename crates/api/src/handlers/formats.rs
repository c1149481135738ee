//! Handlers for stateless format operations: detection, conversion, and
//! validation of caller-supplied content.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use conflux_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct DetectRequest {
    pub content: String,
}

#[derive(Debug, serde::Serialize)]
pub struct DetectResponse {
    pub format: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct ConvertRequest {
    pub content: String,
    pub from: Option<String>,
    pub to: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct ValidateRequest {
    pub content: String,
    pub format: Option<String>,
    pub template_id: Option<DbId>,
}

/// POST /formats/detect
pub async fn detect(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<DetectRequest>,
) -> AppResult<impl IntoResponse> {
    let format = state.service.detect(&input.content)?;
    Ok(Json(DataResponse {
        data: DetectResponse {
            format: format.to_string(),
        },
    }))
}

/// POST /formats/convert
pub async fn convert(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ConvertRequest>,
) -> AppResult<impl IntoResponse> {
    let converted = state
        .service
        .convert(&input.content, input.from.as_deref(), &input.to)?;
    Ok(Json(DataResponse { data: converted }))
}

/// POST /formats/validate
///
/// Always responds 200 with a validation report; syntax and schema problems
/// are data, not errors.
pub async fn validate(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ValidateRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .service
        .validate_content(&input.content, input.format.as_deref(), input.template_id)
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}
