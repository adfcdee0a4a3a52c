/// End-to-end pipeline tests over the shipped model artifact
use arc_swap::ArcSwap;
use axum::extract::State;
use axum::Json;
use std::path::Path;
use std::sync::Arc;

use carpricer::config::Config;
use carpricer::encoder;
use carpricer::error::AppError;
use carpricer::handlers::predict::{handle_predict, AppState, PredictRequest};
use carpricer::models::car::CarSpecification;
use carpricer::predictor::Predictor;
use carpricer::rates::RateTable;

fn load_shipped_predictor() -> Predictor {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("model/price_model.json");
    Predictor::load(&path).expect("shipped artifact must load")
}

fn shipped_state() -> AppState {
    AppState {
        config: Arc::new(Config {
            server: Default::default(),
            model: Default::default(),
            rates: Default::default(),
        }),
        predictor: Arc::new(load_shipped_predictor()),
        rates: Arc::new(ArcSwap::from_pointee(RateTable::fallback())),
    }
}

/// age=5, mileage=60000, displacement=2.0L, 4-cylinder inline engine,
/// Sedan, no accidents
fn reference_sedan() -> CarSpecification {
    CarSpecification {
        car_age: 5,
        mileage: 60_000.0,
        engine_displacement: 2.0,
        engine_cylinders: "I4".to_string(),
        engine_type: "I4".to_string(),
        body_type: "Sedan".to_string(),
        has_accidents: false,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_end_to_end_eur_prediction() {
    let state = shipped_state();
    let car = reference_sedan();

    // Displayed price must equal predict(...) * rate["EUR"] exactly
    let features = encoder::encode(state.predictor.schema(), &car).unwrap();
    let expected_usd = state.predictor.predict(&features).unwrap();
    let expected = state.rates.load().convert(expected_usd, "EUR").unwrap();

    let request = PredictRequest {
        car,
        currency: "EUR".to_string(),
    };
    let response = handle_predict(State(state), Json(request)).await.unwrap();

    assert_eq!(response.price, expected);
    assert_eq!(response.price_usd, expected_usd);
    assert_eq!(response.currency, "EUR");
    assert!(response.formatted.starts_with('€'));
}

#[tokio::test]
async fn test_prediction_is_finite_and_non_negative() {
    let predictor = load_shipped_predictor();

    let extremes = [
        CarSpecification::default(),
        reference_sedan(),
        // cheapest plausible car the validator accepts
        CarSpecification {
            mileage: 1_000_000.0,
            car_age: 100,
            horsepower: 10.0,
            owner_count: 10,
            frame_damaged: true,
            has_accidents: true,
            salvage: true,
            theft_title: true,
            is_cab: true,
            fleet: true,
            ..Default::default()
        },
        // most expensive plausible car
        CarSpecification {
            mileage: 0.0,
            car_age: 0,
            horsepower: 1200.0,
            engine_displacement: 8.0,
            engine_cylinders: "W12".to_string(),
            engine_type: "W12".to_string(),
            body_type: "Convertible".to_string(),
            is_new: true,
            ..Default::default()
        },
    ];

    for spec in extremes {
        assert!(spec.validate().is_ok());
        let features = encoder::encode(predictor.schema(), &spec).unwrap();
        let price = predictor.predict(&features).unwrap();
        assert!(price.is_finite());
        assert!(price >= 0.0);
    }
}

#[tokio::test]
async fn test_encoding_shipped_schema_is_deterministic() {
    let predictor = load_shipped_predictor();
    let spec = reference_sedan();

    let first = encoder::encode(predictor.schema(), &spec).unwrap();
    let second = encoder::encode(predictor.schema(), &spec).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), predictor.feature_width());
}

#[tokio::test]
async fn test_every_training_category_encodes() {
    use carpricer::encoder::Column;

    let predictor = load_shipped_predictor();

    for column in &predictor.schema().columns {
        if let Column::Categorical { name, categories } = column {
            for category in categories {
                let mut spec = reference_sedan();
                match name.as_str() {
                    "body_type" => spec.body_type = category.clone(),
                    "engine_cylinders" => spec.engine_cylinders = category.clone(),
                    "engine_type" => spec.engine_type = category.clone(),
                    "fuel_type" => spec.fuel_type = category.clone(),
                    "listing_color" => spec.listing_color = category.clone(),
                    "transmission" => spec.transmission = category.clone(),
                    "wheel_system" => spec.wheel_system = category.clone(),
                    other => panic!("unexpected categorical column {}", other),
                }

                let features = encoder::encode(predictor.schema(), &spec)
                    .unwrap_or_else(|e| panic!("{}={} failed: {}", name, category, e));
                let price = predictor.predict(&features).unwrap();
                assert!(price.is_finite() && price >= 0.0);
            }
        }
    }
}

#[tokio::test]
async fn test_unseen_category_surfaces_to_the_user() {
    let state = shipped_state();
    let mut car = reference_sedan();
    car.engine_cylinders = "V16".to_string();

    let err = handle_predict(
        State(state),
        Json(PredictRequest {
            car,
            currency: "USD".to_string(),
        }),
    )
    .await
    .unwrap_err();

    match err {
        AppError::UnknownCategory { field, value } => {
            assert_eq!(field, "engine_cylinders");
            assert_eq!(value, "V16");
        }
        other => panic!("expected UnknownCategory, got {}", other),
    }
}

#[tokio::test]
async fn test_unknown_currency_is_rejected_not_defaulted() {
    let state = shipped_state();

    let err = handle_predict(
        State(state),
        Json(PredictRequest {
            car: reference_sedan(),
            currency: "DOGE".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::UnknownCurrency(code) if code == "DOGE"));
}

#[tokio::test]
async fn test_jpy_formatting_drops_decimals() {
    let state = shipped_state();
    let response = handle_predict(
        State(state),
        Json(PredictRequest {
            car: reference_sedan(),
            currency: "JPY".to_string(),
        }),
    )
    .await
    .unwrap();

    assert!(response.formatted.starts_with('¥'));
    assert!(!response.formatted.contains('.'));
}

#[test]
fn test_demo_spec_file_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/sedan.json");
    let raw = std::fs::read_to_string(path).unwrap();
    let car: CarSpecification = serde_json::from_str(&raw).unwrap();

    assert!(car.validate().is_ok());

    let predictor = load_shipped_predictor();
    let features = encoder::encode(predictor.schema(), &car).unwrap();
    assert!(predictor.predict(&features).unwrap() > 0.0);
}
