//! Car specification as collected from the form or the CLI

use serde::{Deserialize, Serialize};

/// A single used-car listing as entered by the user.
///
/// Built once per prediction request and discarded afterwards. Categorical
/// fields carry the raw category strings; whether a value is acceptable is
/// decided against the model artifact's category sets during encoding, not
/// here. `validate` only enforces the numeric ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarSpecification {
    // Basic info
    pub mileage: f64,
    pub car_age: u32,
    pub horsepower: f64,
    pub engine_displacement: f64,
    pub fuel_tank_volume: f64,
    pub city_fuel_economy: f64,
    pub highway_fuel_economy: f64,
    pub days_on_market: u32,
    pub owner_count: u32,
    pub savings_amount: f64,
    pub seller_rating: f64,

    // Dimensions (inches)
    pub back_legroom: f64,
    pub front_legroom: f64,
    pub height: f64,
    pub length: f64,
    pub wheelbase: f64,
    pub width: f64,
    pub maximum_seating: u32,

    // Categorical attributes
    pub body_type: String,
    pub engine_cylinders: String,
    pub engine_type: String,
    pub fuel_type: String,
    pub listing_color: String,
    pub transmission: String,
    pub wheel_system: String,

    // Condition flags
    pub fleet: bool,
    pub frame_damaged: bool,
    pub franchise_dealer: bool,
    pub has_accidents: bool,
    pub is_cab: bool,
    pub is_new: bool,
    pub salvage: bool,
    pub theft_title: bool,
}

impl Default for CarSpecification {
    /// Defaults mirror the form's initial widget values.
    fn default() -> Self {
        Self {
            mileage: 50_000.0,
            car_age: 5,
            horsepower: 200.0,
            engine_displacement: 2.5,
            fuel_tank_volume: 15.0,
            city_fuel_economy: 20.0,
            highway_fuel_economy: 30.0,
            days_on_market: 30,
            owner_count: 1,
            savings_amount: 0.0,
            seller_rating: 4.0,
            back_legroom: 35.0,
            front_legroom: 40.0,
            height: 60.0,
            length: 180.0,
            wheelbase: 100.0,
            width: 70.0,
            maximum_seating: 5,
            body_type: "Sedan".to_string(),
            engine_cylinders: "I4".to_string(),
            engine_type: "I4".to_string(),
            fuel_type: "Gasoline".to_string(),
            listing_color: "UNKNOWN".to_string(),
            transmission: "A".to_string(),
            wheel_system: "FWD".to_string(),
            fleet: false,
            frame_damaged: false,
            franchise_dealer: false,
            has_accidents: false,
            is_cab: false,
            is_new: false,
            salvage: false,
            theft_title: false,
        }
    }
}

impl CarSpecification {
    /// Check every numeric field against its accepted range.
    ///
    /// Returns all violations at once so the page can highlight every bad
    /// field in a single round trip.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        check_range(&mut errors, "mileage", self.mileage, 0.0, 1_000_000.0);
        check_max(&mut errors, "car_age", self.car_age, 100);
        check_range(&mut errors, "horsepower", self.horsepower, 10.0, 1200.0);
        check_range(
            &mut errors,
            "engine_displacement",
            self.engine_displacement,
            0.1,
            10.0,
        );
        check_range(
            &mut errors,
            "fuel_tank_volume",
            self.fuel_tank_volume,
            1.0,
            100.0,
        );
        check_range(
            &mut errors,
            "city_fuel_economy",
            self.city_fuel_economy,
            1.0,
            150.0,
        );
        check_range(
            &mut errors,
            "highway_fuel_economy",
            self.highway_fuel_economy,
            1.0,
            150.0,
        );
        check_max(&mut errors, "owner_count", self.owner_count, 10);
        if self.savings_amount < 0.0 {
            errors.push("savings_amount cannot be negative".to_string());
        }
        check_range(&mut errors, "seller_rating", self.seller_rating, 0.0, 5.0);
        check_range(&mut errors, "back_legroom", self.back_legroom, 10.0, 60.0);
        check_range(&mut errors, "front_legroom", self.front_legroom, 20.0, 70.0);
        check_range(&mut errors, "height", self.height, 30.0, 120.0);
        check_range(&mut errors, "length", self.length, 80.0, 300.0);
        check_range(&mut errors, "wheelbase", self.wheelbase, 50.0, 200.0);
        check_range(&mut errors, "width", self.width, 40.0, 120.0);
        if !(1..=15).contains(&self.maximum_seating) {
            errors.push("maximum_seating must be between 1 and 15".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_range(errors: &mut Vec<String>, field: &str, value: f64, min: f64, max: f64) {
    if !value.is_finite() || value < min || value > max {
        errors.push(format!("{} must be between {} and {}", field, min, max));
    }
}

fn check_max(errors: &mut Vec<String>, field: &str, value: u32, max: u32) {
    if value > max {
        errors.push(format!("{} must be at most {}", field, max));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_is_valid() {
        assert!(CarSpecification::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_horsepower() {
        let spec = CarSpecification {
            horsepower: 2000.0,
            ..Default::default()
        };

        let errors = spec.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("horsepower"));
    }

    #[test]
    fn test_all_violations_reported_together() {
        let spec = CarSpecification {
            horsepower: 5.0,
            engine_displacement: 12.0,
            seller_rating: 7.5,
            ..Default::default()
        };

        let errors = spec.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_negative_mileage_rejected() {
        let spec = CarSpecification {
            mileage: -1.0,
            ..Default::default()
        };

        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_deserialize_fills_missing_fields_with_defaults() {
        let spec: CarSpecification =
            serde_json::from_str(r#"{"mileage": 60000, "body_type": "Coupe"}"#).unwrap();

        assert_eq!(spec.mileage, 60000.0);
        assert_eq!(spec.body_type, "Coupe");
        assert_eq!(spec.car_age, 5);
        assert_eq!(spec.transmission, "A");
    }
}
