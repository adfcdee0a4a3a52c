//! Exchange rates: static fallback table, best-effort live refresh,
//! and conversion from the model's base currency.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::AppError;
use crate::metrics;

/// Where the current table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Live,
    Fallback,
}

/// Currency code → multiplier relative to USD.
///
/// Never mutated in place: refreshes build a new table and swap it in
/// atomically, so request handlers always see a consistent snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct RateTable {
    pub base: String,
    pub source: RateSource,
    pub fetched_at: DateTime<Utc>,
    pub rates: HashMap<String, f64>,
}

impl RateTable {
    /// Static table used before the first successful fetch and whenever
    /// refresh is disabled.
    pub fn fallback() -> Self {
        Self {
            base: "USD".to_string(),
            source: RateSource::Fallback,
            fetched_at: Utc::now(),
            rates: fallback_rates(),
        }
    }

    pub fn live(rates: HashMap<String, f64>) -> Self {
        Self {
            base: "USD".to_string(),
            source: RateSource::Live,
            fetched_at: Utc::now(),
            rates,
        }
    }

    /// Multiplier for `code`, or an error if the code is not in the table.
    /// There is deliberately no default rate to fall back to.
    pub fn rate(&self, code: &str) -> Result<f64, AppError> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| AppError::UnknownCurrency(code.to_string()))
    }

    /// `convert(price, code) = price * rate[code]`
    pub fn convert(&self, price: f64, code: &str) -> Result<f64, AppError> {
        Ok(price * self.rate(code)?)
    }
}

/// Rates as of the last time the external source was reachable at build
/// time. EGP is carried explicitly because the free API tier omits it.
pub fn fallback_rates() -> HashMap<String, f64> {
    HashMap::from([
        ("USD".to_string(), 1.0),
        ("EUR".to_string(), 0.85),
        ("GBP".to_string(), 0.75),
        ("JPY".to_string(), 110.0),
        ("CAD".to_string(), 1.25),
        ("AUD".to_string(), 1.35),
        ("EGP".to_string(), 50.0),
    ])
}

/// A currency offered by the page's selector
#[derive(Debug, Clone, Serialize)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub label: &'static str,
    pub symbol: &'static str,
    pub decimals: u32,
}

pub const DISPLAY_CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "USD", label: "US Dollar ($)", symbol: "$", decimals: 2 },
    CurrencyInfo { code: "EUR", label: "Euro (€)", symbol: "€", decimals: 2 },
    CurrencyInfo { code: "GBP", label: "British Pound (£)", symbol: "£", decimals: 2 },
    CurrencyInfo { code: "JPY", label: "Japanese Yen (¥)", symbol: "¥", decimals: 0 },
    CurrencyInfo { code: "CAD", label: "Canadian Dollar (CA$)", symbol: "CA$", decimals: 2 },
    CurrencyInfo { code: "AUD", label: "Australian Dollar (A$)", symbol: "A$", decimals: 2 },
    CurrencyInfo { code: "EGP", label: "Egyptian Pound (EGP)", symbol: "EGP ", decimals: 2 },
];

pub fn currency_symbol(code: &str) -> &str {
    DISPLAY_CURRENCIES
        .iter()
        .find(|currency| currency.code == code)
        .map(|currency| currency.symbol)
        .unwrap_or(code)
}

pub fn currency_decimals(code: &str) -> u32 {
    DISPLAY_CURRENCIES
        .iter()
        .find(|currency| currency.code == code)
        .map(|currency| currency.decimals)
        .unwrap_or(2)
}

/// Format an amount with thousands separators and the currency's decimal
/// places (yen amounts are whole numbers).
pub fn format_amount(amount: f64, code: &str) -> String {
    let decimals = currency_decimals(code) as usize;
    let plain = format!("{:.*}", decimals, amount);
    group_thousands(&plain)
}

/// Symbol-prefixed display string, e.g. `€12,345.67`
pub fn display_price(amount: f64, code: &str) -> String {
    format!("{}{}", currency_symbol(code), format_amount(amount, code))
}

fn group_thousands(plain: &str) -> String {
    let (sign, rest) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Wire format of the rate endpoint (`open.er-api.com` shape)
#[derive(Debug, Deserialize)]
struct RatesApiResponse {
    result: String,
    rates: HashMap<String, f64>,
}

/// Fetches live rates from the configured endpoint.
pub struct RateProvider {
    client: reqwest::Client,
    url: String,
}

impl RateProvider {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Fetch the current USD-based rate map.
    pub async fn fetch(&self) -> Result<HashMap<String, f64>, AppError> {
        let response = self
            .client
            .get(&self.url)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::RateUnavailable(format!(
                "rate endpoint returned {}",
                response.status()
            )));
        }

        let body: RatesApiResponse = response.json().await?;
        if body.result != "success" {
            return Err(AppError::RateUnavailable(format!(
                "rate endpoint reported result {:?}",
                body.result
            )));
        }

        let mut rates = body.rates;
        // The free API tier omits EGP
        rates.entry("EGP".to_string()).or_insert(50.0);
        Ok(rates)
    }

    /// Fetch and atomically swap the shared table. On failure the previous
    /// table stays in effect; a fetch failure is never fatal.
    pub async fn refresh_into(&self, table: &ArcSwap<RateTable>) -> bool {
        match self.fetch().await {
            Ok(rates) => {
                info!(currencies = rates.len(), "Exchange rates refreshed");
                metrics::record_rate_refresh("success");
                table.store(Arc::new(RateTable::live(rates)));
                true
            }
            Err(e) => {
                warn!(error = %e, "Rate refresh failed, keeping previous table");
                metrics::record_rate_refresh("failure");
                false
            }
        }
    }
}

/// Periodic refresh, spawned once at server startup. The initial fetch
/// happens before the server binds; this loop only handles the steady
/// state.
pub async fn refresh_loop(
    provider: Arc<RateProvider>,
    table: Arc<ArcSwap<RateTable>>,
    ttl: Duration,
) {
    let mut interval = tokio::time::interval(ttl);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // immediate first tick

    loop {
        interval.tick().await;
        provider.refresh_into(&table).await;
    }
}
