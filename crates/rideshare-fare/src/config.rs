use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Hyper-parameters of the gradient-descent trainer.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    /// Step size (alpha).
    pub learning_rate: f64,
    /// Exact number of descent steps; there is no early stopping.
    pub num_iterations: usize,
    /// L2 regularization strength (lambda). The bias is never penalised.
    pub lambda: f64,
    /// Record the cost after every `cost_sample_interval`-th update.
    pub cost_sample_interval: usize,
    /// Log a sampled cost at info level every `cost_log_interval` iterations.
    pub cost_log_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            num_iterations: 10_000,
            lambda: 0.01,
            cost_sample_interval: 100,
            cost_log_interval: 1000,
        }
    }
}

impl TrainingConfig {
    pub fn new(learning_rate: f64, num_iterations: usize, lambda: f64) -> Self {
        Self {
            learning_rate,
            num_iterations,
            lambda,
            ..Self::default()
        }
    }
}

/// Load a training configuration from a JSON file. Missing keys take defaults.
pub fn load_training_config<P: AsRef<Path>>(path: P) -> Result<TrainingConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: TrainingConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}
