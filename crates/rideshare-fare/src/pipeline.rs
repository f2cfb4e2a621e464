//! Training and prediction entry points.
//!
//! `train` runs the whole fit: schema, batch encoding, gradient descent, and
//! returns a fresh bundle. `predict` is a pure function of a bundle and one
//! trip. `load_or_train` is the bootstrap policy for callers that want a
//! bundle on disk no matter what; the core itself never trains implicitly.
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::bundle::ModelBundle;
use crate::config::TrainingConfig;
use crate::data_handling::TripDataset;
use crate::error::{FareError, Result};
use crate::features::FeatureEncoder;
use crate::io::{read_trip_dataset, DatasetColumns};
use crate::metrics::regression_metrics;
use crate::models::{CostSample, RegressionModel, RidgeRegressor};
use crate::preprocessing::fit_schema;

/// A trained bundle plus the diagnostic cost trace of the run that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingOutcome {
    pub bundle: ModelBundle,
    pub cost_history: Vec<CostSample>,
}

impl TrainingOutcome {
    pub fn final_cost(&self) -> Option<f64> {
        self.cost_history.last().map(|s| s.cost)
    }
}

/// Fit schema and weights on a cleaned dataset.
pub fn train(dataset: &TripDataset, config: &TrainingConfig) -> Result<TrainingOutcome> {
    dataset.log_input_data_summary();
    let schema = fit_schema(dataset)?;

    let encoder = FeatureEncoder::new(&schema);
    let x = encoder.encode_batch(dataset);
    let y = dataset.labels();
    log::info!("Training data shape: ({}, {})", x.nrows(), x.ncols());
    log::debug!("Features: {:?}", encoder.feature_names());

    let mut model = RidgeRegressor::new(config.clone());
    let cost_history = model.fit(&x, &y);

    let fitted = regression_metrics(&model.predict(&x).to_vec(), &y.to_vec());
    log::info!(
        "In-sample {} fit (unclamped): RMSE = {:.4}, R² = {:.4}",
        model.name(),
        fitted.rmse,
        fitted.r2
    );
    let (weights, bias) = model.into_parameters();

    Ok(TrainingOutcome {
        bundle: ModelBundle::new(weights, bias, schema),
        cost_history,
    })
}

/// Predicted fare for one trip, never negative.
pub fn predict(
    bundle: &ModelBundle,
    distance: f64,
    surge_multiplier: f64,
    cab_type: &str,
    ride_name: &str,
) -> f64 {
    bundle.predict(distance, surge_multiplier, cab_type, ride_name)
}

/// Load the bundle at `bundle_path`, or train one from `dataset_path` and
/// save it there if none exists.
pub fn load_or_train<P, Q>(
    bundle_path: P,
    dataset_path: Q,
    columns: &DatasetColumns,
    config: &TrainingConfig,
) -> anyhow::Result<ModelBundle>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let bundle_path = bundle_path.as_ref();
    match ModelBundle::load(bundle_path) {
        Ok(bundle) => Ok(bundle),
        Err(FareError::MissingBundle { .. }) => {
            log::info!(
                "Model not found at {}, training new model...",
                bundle_path.display()
            );
            let dataset = read_trip_dataset(dataset_path.as_ref(), columns)?;
            let outcome = train(&dataset, config).context("Training failed")?;
            outcome
                .bundle
                .save(bundle_path)
                .with_context(|| format!("Failed to save model to {}", bundle_path.display()))?;
            Ok(outcome.bundle)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load model from {}", bundle_path.display())),
    }
}
