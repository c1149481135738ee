//! Handlers for configuration template management.
//!
//! Templates are readable by any authenticated user; mutations require the
//! admin role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use conflux_core::types::DbId;
use conflux_db::models::{CreateTemplate, UpdateTemplate};
use conflux_db::repositories::TemplateFilter;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_admin;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct ListTemplatesParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /templates
///
/// List templates with optional category and search filtering.
pub async fn list_templates(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListTemplatesParams>,
) -> AppResult<impl IntoResponse> {
    let filter = TemplateFilter {
        category: params.category,
        search: params.search,
    };
    let page = state
        .service
        .list_templates(filter, params.page, params.limit)
        .await?;

    Ok(Json(ListResponse {
        data: page.items,
        total: page.total,
        page: page.page,
        limit: page.limit,
    }))
}

/// GET /templates/{id}
pub async fn get_template(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = state.service.get_template(id).await?;
    Ok(Json(DataResponse { data: template }))
}

/// POST /templates (admin only)
pub async fn create_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTemplate>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth)?;

    let template = state.service.create_template(input).await?;
    tracing::info!(
        user_id = auth.user_id,
        template_id = template.id,
        name = %template.name,
        "Template created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// PUT /templates/{id} (admin only)
pub async fn update_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplate>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth)?;

    let template = state.service.update_template(id, input).await?;
    Ok(Json(DataResponse { data: template }))
}

/// DELETE /templates/{id} (admin only)
pub async fn delete_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth)?;

    state.service.delete_template(id).await?;
    tracing::info!(user_id = auth.user_id, template_id = id, "Template deleted");
    Ok(StatusCode::NO_CONTENT)
}
