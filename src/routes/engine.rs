//! Engine status endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::Result;
use crate::office::{LoadStats, VersionInfo};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResponse {
    pub install_path: String,
    /// Absent while the engine is busy, since reading it would block
    pub version: Option<VersionInfo>,
    pub busy: bool,
    pub load_timeout_ms: u64,
    pub loads: LoadStats,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(engine_status))
}

async fn engine_status(State(state): State<AppState>) -> Result<Json<EngineResponse>> {
    let office = state.office().clone();
    let busy = office.is_busy();

    let version = if busy {
        None
    } else {
        let office = office.clone();
        let info = tokio::task::spawn_blocking(move || office.version_info())
            .await
            .map_err(|e| crate::error::AppError::Internal(e.to_string()))?;
        match info {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!("Engine version unavailable: {}", e);
                None
            }
        }
    };

    Ok(Json(EngineResponse {
        install_path: office.install_path().display().to_string(),
        version,
        busy,
        load_timeout_ms: state.config().office.load_timeout_ms,
        loads: office.load_stats(),
    }))
}
