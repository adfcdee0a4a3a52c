//! Rate table inspection endpoint, also feeds the page's currency selector

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::handlers::predict::AppState;
use crate::rates::{RateSource, DISPLAY_CURRENCIES};

#[derive(Debug, Serialize)]
pub struct RatesResponse {
    pub base: String,
    pub source: RateSource,
    pub fetched_at: DateTime<Utc>,
    /// Currencies offered by the page, with their current rates
    pub currencies: Vec<CurrencyOption>,
    /// Full table, for clients that want codes beyond the display list
    pub rates: HashMap<String, f64>,
}

#[derive(Debug, Serialize)]
pub struct CurrencyOption {
    pub code: &'static str,
    pub label: &'static str,
    pub symbol: &'static str,
    pub decimals: u32,
    pub rate: Option<f64>,
}

/// Handle GET /api/v1/rates
pub async fn list_rates(State(state): State<AppState>) -> Json<RatesResponse> {
    let table = state.rates.load();

    let currencies = DISPLAY_CURRENCIES
        .iter()
        .map(|currency| CurrencyOption {
            code: currency.code,
            label: currency.label,
            symbol: currency.symbol,
            decimals: currency.decimals,
            rate: table.rates.get(currency.code).copied(),
        })
        .collect();

    Json(RatesResponse {
        base: table.base.clone(),
        source: table.source,
        fetched_at: table.fetched_at,
        currencies,
        rates: table.rates.clone(),
    })
}
