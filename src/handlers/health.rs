use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service information
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "code": "Success",
        "data": {
            "name": "Waysbucks API",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "profiles": "/api/v1/profiles (protected)",
                "profile": "/api/v1/profile[/:id] (protected)",
            }
        }
    }))
}

/// GET /health - liveness plus database reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.profiles.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "code": "Success",
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "code": StatusCode::SERVICE_UNAVAILABLE.as_u16(),
                    "message": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                    }
                })),
            )
        }
    }
}
