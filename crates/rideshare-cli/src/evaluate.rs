use std::path::Path;

use anyhow::{Context, Result};

use rideshare_fare::io::{read_trip_dataset, DatasetColumns};
use rideshare_fare::metrics::{evaluate, RegressionMetrics};
use rideshare_fare::ModelBundle;

use crate::util::validate_trip_table;

pub fn run_evaluation(model_path: &Path, data_path: &Path) -> Result<RegressionMetrics> {
    let bundle = ModelBundle::load(model_path)
        .with_context(|| format!("Failed to load model from {}", model_path.display()))?;
    validate_trip_table(data_path)?;
    let dataset = read_trip_dataset(data_path, &DatasetColumns::default())?;
    if dataset.is_empty() {
        anyhow::bail!("No complete trips in {}", data_path.display());
    }
    Ok(evaluate(&bundle, &dataset))
}
