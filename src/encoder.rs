//! Car attributes → model feature vector
//!
//! The column schema travels inside the model artifact, so the encoding here
//! always follows the exact column order and category sets the model was
//! trained with. Numeric columns are standardized with the training mean/std,
//! condition flags become 0/1, and categorical columns are one-hot encoded.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::car::CarSpecification;

/// One column of the training-time feature schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Column {
    /// Continuous value, standardized as `(value - mean) / std`
    Numeric { name: String, mean: f64, std: f64 },
    /// Boolean condition flag, encoded as 0.0 / 1.0
    Flag { name: String },
    /// One-hot over the training-time category set, in set order
    Categorical { name: String, categories: Vec<String> },
}

impl Column {
    pub fn name(&self) -> &str {
        match self {
            Self::Numeric { name, .. } => name,
            Self::Flag { name } => name,
            Self::Categorical { name, .. } => name,
        }
    }

    /// Number of feature slots this column expands to
    pub fn width(&self) -> usize {
        match self {
            Self::Numeric { .. } | Self::Flag { .. } => 1,
            Self::Categorical { categories, .. } => categories.len(),
        }
    }
}

/// Ordered feature schema carried by the model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub columns: Vec<Column>,
}

impl FeatureSchema {
    /// Total width of the encoded feature vector
    pub fn width(&self) -> usize {
        self.columns.iter().map(Column::width).sum()
    }

    /// Schema columns that do not correspond to any car attribute.
    ///
    /// Checked once when the artifact is loaded so a stale or mistyped
    /// schema is a startup failure instead of a per-request one.
    pub fn unrecognized_columns(&self) -> Vec<String> {
        let probe = CarSpecification::default();
        self.columns
            .iter()
            .filter(|column| match column {
                Column::Numeric { name, .. } => numeric_value(&probe, name).is_none(),
                Column::Flag { name } => flag_value(&probe, name).is_none(),
                Column::Categorical { name, .. } => category_value(&probe, name).is_none(),
            })
            .map(|column| column.name().to_string())
            .collect()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    #[error("unknown {field} value {value:?}")]
    UnknownCategory { field: String, value: String },

    #[error("schema references unknown feature column {0:?}")]
    UnsupportedColumn(String),
}

/// Encode a car specification into the model's feature vector.
///
/// Deterministic and side-effect free. An unseen categorical value is an
/// error: defaulting it silently would produce a confidently wrong price.
pub fn encode(
    schema: &FeatureSchema,
    spec: &CarSpecification,
) -> Result<Array1<f64>, EncodeError> {
    let mut features = Vec::with_capacity(schema.width());

    for column in &schema.columns {
        match column {
            Column::Numeric { name, mean, std } => {
                let value = numeric_value(spec, name)
                    .ok_or_else(|| EncodeError::UnsupportedColumn(name.clone()))?;
                let std = if *std > 0.0 { *std } else { 1.0 };
                features.push((value - mean) / std);
            }
            Column::Flag { name } => {
                let value = flag_value(spec, name)
                    .ok_or_else(|| EncodeError::UnsupportedColumn(name.clone()))?;
                features.push(if value { 1.0 } else { 0.0 });
            }
            Column::Categorical { name, categories } => {
                let value = category_value(spec, name)
                    .ok_or_else(|| EncodeError::UnsupportedColumn(name.clone()))?;
                let hit = categories.iter().position(|category| category == value).ok_or_else(
                    || EncodeError::UnknownCategory {
                        field: name.clone(),
                        value: value.to_string(),
                    },
                )?;
                features.extend((0..categories.len()).map(|i| if i == hit { 1.0 } else { 0.0 }));
            }
        }
    }

    Ok(Array1::from_vec(features))
}

fn numeric_value(spec: &CarSpecification, name: &str) -> Option<f64> {
    match name {
        "mileage" => Some(spec.mileage),
        "car_age" => Some(f64::from(spec.car_age)),
        "horsepower" => Some(spec.horsepower),
        "engine_displacement" => Some(spec.engine_displacement),
        "fuel_tank_volume" => Some(spec.fuel_tank_volume),
        "city_fuel_economy" => Some(spec.city_fuel_economy),
        "highway_fuel_economy" => Some(spec.highway_fuel_economy),
        "days_on_market" => Some(f64::from(spec.days_on_market)),
        "owner_count" => Some(f64::from(spec.owner_count)),
        "savings_amount" => Some(spec.savings_amount),
        "seller_rating" => Some(spec.seller_rating),
        "back_legroom" => Some(spec.back_legroom),
        "front_legroom" => Some(spec.front_legroom),
        "height" => Some(spec.height),
        "length" => Some(spec.length),
        "wheelbase" => Some(spec.wheelbase),
        "width" => Some(spec.width),
        "maximum_seating" => Some(f64::from(spec.maximum_seating)),
        _ => None,
    }
}

fn flag_value(spec: &CarSpecification, name: &str) -> Option<bool> {
    match name {
        "fleet" => Some(spec.fleet),
        "frame_damaged" => Some(spec.frame_damaged),
        "franchise_dealer" => Some(spec.franchise_dealer),
        "has_accidents" => Some(spec.has_accidents),
        "is_cab" => Some(spec.is_cab),
        "is_new" => Some(spec.is_new),
        "salvage" => Some(spec.salvage),
        "theft_title" => Some(spec.theft_title),
        _ => None,
    }
}

fn category_value<'a>(spec: &'a CarSpecification, name: &str) -> Option<&'a str> {
    match name {
        "body_type" => Some(&spec.body_type),
        "engine_cylinders" => Some(&spec.engine_cylinders),
        "engine_type" => Some(&spec.engine_type),
        "fuel_type" => Some(&spec.fuel_type),
        "listing_color" => Some(&spec.listing_color),
        "transmission" => Some(&spec.transmission),
        "wheel_system" => Some(&spec.wheel_system),
        _ => None,
    }
}
