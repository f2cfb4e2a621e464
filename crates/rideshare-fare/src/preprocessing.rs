//! Schema fitting: z-score statistics and categorical vocabularies.
//!
//! A `FeatureSchema` is fitted once per training run and never changes
//! afterwards. Its vocabularies keep first-encounter order, which defines the
//! one-hot column order for the lifetime of the bundle that carries it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data_handling::TripDataset;
use crate::error::{FareError, Result};

/// Names of the two numeric input columns, in encoding order.
pub const NUMERIC_FEATURES: [&str; 2] = ["distance", "surge_multiplier"];

/// Number of polynomial columns derived from the normalized numeric pair.
pub const POLYNOMIAL_FEATURES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Population means of `[distance, surge_multiplier]`.
    pub feature_means: [f64; 2],
    /// Population standard deviations of `[distance, surge_multiplier]`, never zero.
    pub feature_stds: [f64; 2],
    pub cab_vocabulary: Vec<String>,
    pub ride_vocabulary: Vec<String>,
}

impl FeatureSchema {
    /// Total width N of an encoded feature vector.
    pub fn dimension(&self) -> usize {
        NUMERIC_FEATURES.len()
            + POLYNOMIAL_FEATURES
            + self.cab_vocabulary.len()
            + self.ride_vocabulary.len()
    }

    /// Position of `cab_type` in the cab vocabulary, if it was seen in training.
    pub fn cab_index(&self, cab_type: &str) -> Option<usize> {
        self.cab_vocabulary.iter().position(|v| v == cab_type)
    }

    /// Position of `ride_name` in the ride vocabulary, if it was seen in training.
    pub fn ride_index(&self, ride_name: &str) -> Option<usize> {
        self.ride_vocabulary.iter().position(|v| v == ride_name)
    }

    /// z-score a `(distance, surge_multiplier)` pair.
    #[inline]
    pub fn normalize(&self, distance: f64, surge_multiplier: f64) -> (f64, f64) {
        (
            (distance - self.feature_means[0]) / self.feature_stds[0],
            (surge_multiplier - self.feature_means[1]) / self.feature_stds[1],
        )
    }

    pub fn log_summary(&self) {
        log::info!(
            "Schema: means {:?}, stds {:?}, {} cab types, {} ride names, {} features",
            self.feature_means,
            self.feature_stds,
            self.cab_vocabulary.len(),
            self.ride_vocabulary.len(),
            self.dimension()
        );
    }
}

/// Distinct values in the order they are first seen. Empty cells are missing
/// values and get no vocabulary entry.
fn first_encounter_order<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut vocabulary = Vec::new();
    for value in values {
        if !value.is_empty() && seen.insert(value) {
            vocabulary.push(value.to_string());
        }
    }
    vocabulary
}

/// Population mean and standard deviation of one column.
///
/// A column whose values are all identical is degenerate even when rounding
/// leaves a tiny non-zero deviation.
fn column_stats(values: &[f64], feature: &'static str) -> Result<(f64, f64)> {
    let mean = values.iter().mean();
    let std = values.iter().population_std_dev();

    let constant = values.windows(2).all(|w| w[0] == w[1]);
    if constant || std == 0.0 || !std.is_finite() {
        return Err(FareError::DegenerateFeature { feature });
    }
    Ok((mean, std))
}

/// Fit the encoding schema on a cleaned dataset.
pub fn fit_schema(dataset: &TripDataset) -> Result<FeatureSchema> {
    if dataset.is_empty() {
        return Err(FareError::EmptyDataset);
    }

    let examples = dataset.examples();
    let distances: Vec<f64> = examples.iter().map(|e| e.distance).collect();
    let surges: Vec<f64> = examples.iter().map(|e| e.surge_multiplier).collect();

    let (distance_mean, distance_std) = column_stats(&distances, NUMERIC_FEATURES[0])?;
    let (surge_mean, surge_std) = column_stats(&surges, NUMERIC_FEATURES[1])?;

    let schema = FeatureSchema {
        feature_means: [distance_mean, surge_mean],
        feature_stds: [distance_std, surge_std],
        cab_vocabulary: first_encounter_order(examples.iter().map(|e| e.cab_type.as_str())),
        ride_vocabulary: first_encounter_order(examples.iter().map(|e| e.ride_name.as_str())),
    };
    schema.log_summary();
    Ok(schema)
}
