use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::handlers::predict::AppState;
use crate::rates::RateSource;

/// Handle GET /health - liveness probe
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub model: ReadyModel,
    pub rate_source: RateSource,
    pub rate_refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct ReadyModel {
    pub name: String,
    pub version: String,
    pub feature_width: usize,
}

/// Handle GET /ready - readiness probe
///
/// The model is loaded before the listener binds, so a serving process is
/// always ready; the payload documents what it is serving with.
pub async fn readiness_check(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        status: "ready",
        model: ReadyModel {
            name: state.predictor.name().to_string(),
            version: state.predictor.version().to_string(),
            feature_width: state.predictor.feature_width(),
        },
        rate_source: state.rates.load().source,
        rate_refresh: state.config.rates.refresh,
    })
}
