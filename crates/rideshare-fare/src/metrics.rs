use serde::{Deserialize, Serialize};

use crate::bundle::ModelBundle;
use crate::data_handling::TripDataset;

/// Error summary of a bundle over a labelled dataset. Predictions are clamped,
/// as served.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub n: usize,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

pub fn regression_metrics(predictions: &[f64], targets: &[f64]) -> RegressionMetrics {
    assert_eq!(
        predictions.len(),
        targets.len(),
        "predictions and targets must have the same length"
    );
    let n = targets.len();
    if n == 0 {
        return RegressionMetrics { n, rmse: f64::NAN, mae: f64::NAN, r2: f64::NAN };
    }
    let nf = n as f64;
    let mean = targets.iter().sum::<f64>() / nf;

    let mut sse = 0.0;
    let mut sae = 0.0;
    let mut sst = 0.0;
    for (p, y) in predictions.iter().zip(targets) {
        let e = p - y;
        sse += e * e;
        sae += e.abs();
        sst += (y - mean) * (y - mean);
    }

    RegressionMetrics {
        n,
        rmse: (sse / nf).sqrt(),
        mae: sae / nf,
        r2: if sst > 0.0 { 1.0 - sse / sst } else { f64::NAN },
    }
}

pub fn evaluate(bundle: &ModelBundle, dataset: &TripDataset) -> RegressionMetrics {
    let predictions: Vec<f64> = dataset
        .examples()
        .iter()
        .map(|e| bundle.predict(e.distance, e.surge_multiplier, &e.cab_type, &e.ride_name))
        .collect();
    let targets: Vec<f64> = dataset.examples().iter().map(|e| e.price).collect();
    let metrics = regression_metrics(&predictions, &targets);
    log::info!(
        "Evaluated {} trips: RMSE = {:.4}, MAE = {:.4}, R² = {:.4}",
        metrics.n,
        metrics.rmse,
        metrics.mae,
        metrics.r2
    );
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let m = regression_metrics(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn constant_offset() {
        let m = regression_metrics(&[2.0, 3.0, 4.0, 5.0], &[1.0, 2.0, 3.0, 4.0]);
        assert!((m.rmse - 1.0).abs() < 1e-12);
        assert!((m.mae - 1.0).abs() < 1e-12);
        // sst = 5, sse = 4
        assert!((m.r2 - 0.2).abs() < 1e-12);
    }
}
