//! Liveness endpoints
//!
//! Reads engine state without taking the engine lock. `engine` is `busy`
//! while a load or an abandoned load is still inside the engine.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineReadiness {
    Ready,
    Busy,
}

impl EngineReadiness {
    fn from_busy(busy: bool) -> Self {
        if busy {
            EngineReadiness::Busy
        } else {
            EngineReadiness::Ready
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub engine: EngineReadiness,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        engine: EngineReadiness::from_busy(state.office().is_busy()),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}
