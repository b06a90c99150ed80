//! # Health Command
//!
//! Liveness plus migration status, for load balancers and diagnostics.

use serde::Serialize;
use tracing::{debug, warn};

use kirana_db::migrations::migration_status;

use crate::commands::ApiResponse;
use crate::error::ApiError;
use crate::state::DbState;

/// Health report body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// True when the database answers and every migration is applied
    pub healthy: bool,
    pub database: bool,
    pub migrations_total: usize,
    pub migrations_applied: usize,
    pub version: &'static str,
}

/// Reports whether the service can serve requests.
///
/// Always answers 200; callers read `healthy`.
pub async fn health(db: &DbState) -> Result<ApiResponse<HealthStatus>, ApiError> {
    debug!("health command");

    let database = db.inner().health_check().await;
    let (migrations_total, migrations_applied) = if database {
        migration_status(db.inner().pool()).await?
    } else {
        warn!("Database health check failed");
        (0, 0)
    };

    Ok(ApiResponse::ok(HealthStatus {
        healthy: database && migrations_applied == migrations_total,
        database,
        migrations_total,
        migrations_applied,
        version: env!("CARGO_PKG_VERSION"),
    }))
}
