use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use rideshare_fare::io::DatasetColumns;
use rideshare_fare::config::load_training_config;
use rideshare_fare::TrainingConfig;

use crate::util::validate_trip_table;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub train_data: String,
    pub output_file: String,
    pub report_file: Option<String>,
    pub columns: DatasetColumns,
    pub training: TrainingConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            train_data: String::from("rideshare_kaggle.csv"),
            output_file: String::from("model.json"),
            report_file: None,
            columns: DatasetColumns::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl TrainConfig {
    /// Read the JSON config (if any) and apply command-line overrides.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                let config_json = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                serde_json::from_str(&config_json)
                    .with_context(|| format!("Failed to parse config file: {:?}", path))?
            }
            None => TrainConfig::default(),
        };

        if let Some(train_data) = matches.get_one::<String>("train_data") {
            config.train_data = train_data.clone();
        }
        validate_trip_table(&config.train_data)?;

        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_file = output_file.clone();
        }

        if let Some(report_file) = matches.get_one::<String>("report_file") {
            config.report_file = Some(report_file.clone());
        }

        if let Some(path) = matches.get_one::<PathBuf>("hyperparameters") {
            config.training = load_training_config(path)?;
        }

        if let Some(iterations) = matches.get_one::<usize>("iterations") {
            config.training.num_iterations = *iterations;
        }

        Ok(config)
    }
}
