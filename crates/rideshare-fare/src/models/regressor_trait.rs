use ndarray::{Array1, Array2};

use crate::models::ridge::CostSample;

/// Contract for a regressor trained on an encoded feature matrix.
pub trait RegressionModel {
    /// Fit the model on `x` (m × N) and targets `y` (m). Returns the sampled
    /// cost trace, which is diagnostic only.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Vec<CostSample>;

    /// Raw predictions, one per row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Array1<f64>;

    fn name(&self) -> &str {
        "regressor"
    }
}
