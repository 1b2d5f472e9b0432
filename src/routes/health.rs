use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub scratch_dir: ComponentHealth,
    pub face_service: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
}

impl ComponentHealth {
    fn from_result<E: std::fmt::Display>(
        name: &str,
        start: std::time::Instant,
        result: Result<(), E>,
    ) -> Self {
        match result {
            Ok(()) => Self {
                status: "ok".to_string(),
                latency_ms: Some(start.elapsed().as_millis() as u64),
            },
            Err(e) => {
                tracing::warn!(component = name, error = %e, "Health check failed");
                Self {
                    status: "error".to_string(),
                    latency_ms: None,
                }
            }
        }
    }
}

/// GET /health — scratch directory and face service status.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = std::time::Instant::now();
    let scratch = state.scratch.clone();
    let scratch_result = match tokio::task::spawn_blocking(move || scratch.probe()).await {
        Ok(result) => result,
        Err(e) => Err(std::io::Error::other(e)),
    };
    let scratch_check = ComponentHealth::from_result("scratch_dir", start, scratch_result);

    let face_start = std::time::Instant::now();
    let face_check =
        ComponentHealth::from_result("face_service", face_start, state.comparer.health_check().await);

    let all_healthy = scratch_check.status == "ok" && face_check.status == "ok";
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if all_healthy {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            scratch_dir: scratch_check,
            face_service: face_check,
        },
    };

    (status_code, Json(response))
}
