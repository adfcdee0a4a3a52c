//! The prediction pipeline endpoint

use arc_swap::ArcSwap;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::encoder;
use crate::error::AppError;
use crate::metrics;
use crate::models::car::CarSpecification;
use crate::predictor::Predictor;
use crate::rates::{self, RateTable};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub predictor: Arc<Predictor>,
    pub rates: Arc<ArcSwap<RateTable>>,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(flatten)]
    pub car: CarSpecification,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Price in the requested currency
    pub price: f64,
    pub currency: String,
    pub symbol: String,
    /// Display string, e.g. `€12,345.67` (yen without decimals)
    pub formatted: String,
    /// Price in the model's base currency
    pub price_usd: f64,
    /// Rate applied to `price_usd`
    pub rate: f64,
    pub model: ModelInfo,
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
}

/// Handle POST /api/v1/predict
///
/// Pipeline: validate ranges → encode features → predict (USD) → convert to
/// the requested currency → format for display.
pub async fn handle_predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    let start = Instant::now();

    let outcome = run_pipeline(&state, &request);

    match &outcome {
        Ok(response) => {
            metrics::record_prediction(&request.currency, &request.car.body_type);
            metrics::record_duration(start.elapsed());

            tracing::info!(
                currency = %request.currency,
                body_type = %request.car.body_type,
                price_usd = response.price_usd,
                price = response.price,
                duration_ms = start.elapsed().as_millis() as u64,
                "Prediction served"
            );
        }
        Err(e) => {
            metrics::record_error(e.error_type());

            tracing::info!(
                currency = %request.currency,
                error = %e,
                "Prediction rejected"
            );
        }
    }

    outcome.map(Json)
}

fn run_pipeline(state: &AppState, request: &PredictRequest) -> Result<PredictResponse, AppError> {
    // 1. Range validation before any inference
    request.car.validate().map_err(AppError::Validation)?;

    // 2. Encode against the artifact's schema
    let features = encoder::encode(state.predictor.schema(), &request.car)?;

    // 3. Predict in the model's base currency
    let price_usd = state.predictor.predict(&features)?;

    // 4. Convert using the current rate table snapshot
    let table = state.rates.load();
    let rate = table.rate(&request.currency)?;
    let price = price_usd * rate;

    Ok(PredictResponse {
        price,
        currency: request.currency.clone(),
        symbol: rates::currency_symbol(&request.currency).to_string(),
        formatted: rates::display_price(price, &request.currency),
        price_usd,
        rate,
        model: ModelInfo {
            name: state.predictor.name().to_string(),
            version: state.predictor.version().to_string(),
        },
    })
}
