use std::sync::Arc;

use conflux_db::repositories::PgStore;

use crate::config::ServerConfig;
use crate::service::ConfigService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (used directly only by the health check).
    pub pool: conflux_db::DbPool,
    /// Server configuration (JWT secret, timeouts, CORS).
    pub config: Arc<ServerConfig>,
    /// The configuration service backing all domain endpoints.
    pub service: Arc<ConfigService<PgStore>>,
}
