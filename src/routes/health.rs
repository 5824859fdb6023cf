//! Health check endpoints
//!
//! - /health, /healthz - liveness, 200 whenever the process is serving
//! - /ready, /readyz - readiness, 200 only if the store answers a ping
//! - /version - build information

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::response::{json_response, FullBody};
use crate::server::AppState;

/// Liveness and readiness payload
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall health status
    pub healthy: bool,
    /// 'online' or 'degraded'
    pub status: &'static str,
    pub version: &'static str,
    /// Seconds since the server started
    pub uptime: u64,
    pub timestamp: String,
    /// 'development' or 'production'
    pub mode: &'static str,
    pub node_id: String,
    /// Storage backend in use (`mongodb` or `memory`)
    pub backend: &'static str,
    /// Store reachability; only probed by the readiness check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_connected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    HealthResponse {
        healthy: true,
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        node_id: state.args.node_id.to_string(),
        backend: state.repo.backend(),
        database_connected: None,
        error: None,
    }
}

/// Handle liveness probe (/health, /healthz)
pub fn health_check(state: &AppState) -> Response<FullBody> {
    json_response(StatusCode::OK, "OK", &build_health_response(state))
}

/// Handle readiness probe (/ready, /readyz)
///
/// Pings the store on every call; 503 while it is unreachable.
pub async fn readiness_check(state: &AppState) -> Response<FullBody> {
    let mut response = build_health_response(state);

    let status = match state.repo.ping().await {
        Ok(()) => {
            response.database_connected = Some(true);
            StatusCode::OK
        }
        Err(e) => {
            response.healthy = false;
            response.status = "degraded";
            response.database_connected = Some(false);
            response.error = Some(e.to_string());
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let reason = if status == StatusCode::OK {
        "OK"
    } else {
        "Service Unavailable"
    };
    json_response(status, reason, &response)
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    /// Cargo package version
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    /// Git commit hash (full)
    pub commit_full: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Service name
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<FullBody> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "quire",
    };

    json_response(StatusCode::OK, "OK", &response)
}
