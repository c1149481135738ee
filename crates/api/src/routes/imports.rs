//! Route definitions for import tracking, registered under `/imports`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::imports;
use crate::state::AppState;

/// ```text
/// GET  /              list_imports
/// POST /              create_import
/// GET  /{id}          get_import
/// PUT  /{id}/status   update_import_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(imports::list_imports).post(imports::create_import))
        .route("/{id}", get(imports::get_import))
        .route("/{id}/status", put(imports::update_import_status))
}
