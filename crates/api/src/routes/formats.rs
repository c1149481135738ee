//! Route definitions for stateless format operations, registered under
//! `/formats`.

use axum::routing::post;
use axum::Router;

use crate::handlers::formats;
use crate::state::AppState;

/// ```text
/// POST /detect    detect
/// POST /convert   convert
/// POST /validate  validate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/detect", post(formats::detect))
        .route("/convert", post(formats::convert))
        .route("/validate", post(formats::validate))
}
