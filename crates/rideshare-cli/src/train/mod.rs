pub mod input;

use anyhow::{Context, Result};

use rideshare_fare::io::read_trip_dataset;
use rideshare_fare::metrics::evaluate;
use rideshare_fare::report::write_training_report;
use rideshare_fare::{train, TrainingOutcome};

use input::TrainConfig;

/// Train a bundle from the configured dataset, save it, and optionally write a report.
pub fn run_training(config: &TrainConfig) -> Result<TrainingOutcome> {
    let dataset = read_trip_dataset(&config.train_data, &config.columns)?;
    log::info!("Loaded {} complete training trips", dataset.len());

    let outcome = train(&dataset, &config.training).context("Training failed")?;

    outcome
        .bundle
        .save(&config.output_file)
        .with_context(|| format!("Failed to save model to {}", config.output_file))?;

    if let Some(report_file) = &config.report_file {
        let metrics = evaluate(&outcome.bundle, &dataset);
        write_training_report(report_file, &outcome, Some(&metrics))
            .with_context(|| format!("Failed to write report to {}", report_file))?;
    }

    Ok(outcome)
}
