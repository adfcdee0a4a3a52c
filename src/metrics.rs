use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();

    let handle = builder
        .install_recorder()
        .expect("Failed to install Prometheus recorder");

    init_metric_descriptions();

    handle
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "car_predictions_total",
        "Total number of price predictions served"
    );
    describe_histogram!(
        "car_prediction_duration_seconds",
        "Prediction pipeline duration in seconds"
    );
    describe_counter!(
        "car_prediction_errors_total",
        "Total number of failed prediction requests"
    );
    describe_counter!(
        "car_rate_refresh_total",
        "Exchange rate refresh attempts by outcome"
    );
    describe_gauge!("carpricer_info", "Application version information");

    gauge!("carpricer_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a served prediction
pub fn record_prediction(currency: &str, body_type: &str) {
    counter!(
        "car_predictions_total",
        "currency" => currency.to_string(),
        "body_type" => body_type.to_string(),
    )
    .increment(1);
}

/// Record prediction pipeline duration
pub fn record_duration(duration: Duration) {
    histogram!("car_prediction_duration_seconds").record(duration.as_secs_f64());
}

/// Record a failed prediction request
pub fn record_error(error_type: &str) {
    counter!(
        "car_prediction_errors_total",
        "error_type" => error_type.to_string(),
    )
    .increment(1);
}

/// Record a rate refresh attempt
pub fn record_rate_refresh(outcome: &'static str) {
    counter!("car_rate_refresh_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_metrics() {
        init_metric_descriptions();

        record_prediction("EUR", "Sedan");
        record_duration(Duration::from_millis(3));
        record_error("unknown_currency");
        record_rate_refresh("success");

        // Just verify the calls don't panic; values are checked through the
        // exporter in integration environments
    }
}
