use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use rideshare_fare::data_handling::FareQuery;
use rideshare_fare::io::{read_fare_queries, write_predictions, write_predictions_to, DatasetColumns};
use rideshare_fare::{load_or_train, ModelBundle, TrainingConfig};

use crate::util::{validate_trip_inputs, validate_trip_table};

/// Response body of a single prediction, as printed with `--json`.
#[derive(Debug, Serialize)]
pub struct PredictionResponse<'a> {
    pub success: bool,
    pub predicted_price: f64,
    pub distance: f64,
    pub surge_multiplier: f64,
    pub cab_type: &'a str,
    pub ride_name: &'a str,
}

/// Load the bundle, or bootstrap it from `auto_train` data when it is missing.
pub fn load_bundle(model_path: &Path, auto_train: Option<&PathBuf>) -> Result<ModelBundle> {
    match auto_train {
        Some(data) => load_or_train(
            model_path,
            data,
            &DatasetColumns::default(),
            &TrainingConfig::default(),
        ),
        None => ModelBundle::load(model_path)
            .with_context(|| format!("Failed to load model from {}", model_path.display())),
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn predict_single(bundle: &ModelBundle, query: &FareQuery, json: bool) -> Result<String> {
    validate_trip_inputs(query.distance, query.surge_multiplier)?;
    let price = round_to_cents(bundle.predict_query(query));

    if json {
        let response = PredictionResponse {
            success: true,
            predicted_price: price,
            distance: query.distance,
            surge_multiplier: query.surge_multiplier,
            cab_type: &query.cab_type,
            ride_name: &query.ride_name,
        };
        Ok(serde_json::to_string_pretty(&response)?)
    } else {
        Ok(format!("{:.2}", price))
    }
}

/// Predict every row of `input` and write the table to `output` or stdout.
pub fn predict_file(bundle: &ModelBundle, input: &Path, output: Option<&PathBuf>) -> Result<usize> {
    validate_trip_table(input)?;
    let queries = read_fare_queries(input, &DatasetColumns::default())?;
    for (row, q) in queries.iter().enumerate() {
        validate_trip_inputs(q.distance, q.surge_multiplier)
            .with_context(|| format!("Invalid input at row {}", row + 1))?;
    }

    let predictions = bundle.predict_batch(&queries);
    match output {
        Some(path) => write_predictions(path, &queries, &predictions)?,
        None => write_predictions_to(io::stdout().lock(), b',', &queries, &predictions)?,
    }
    Ok(queries.len())
}
