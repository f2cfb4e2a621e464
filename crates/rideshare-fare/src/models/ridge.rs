//! L2-regularised linear regression fitted by batch gradient descent.
//!
//! J(w, b) = 1/(2m) Σ (w·xᵢ + b − yᵢ)² + λ/(2m) ‖w‖²
//!
//! Training starts from w = 0, b = 0 and always runs the configured number
//! of iterations. Nothing here is random, so identical inputs give
//! bit-identical weights.
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::TrainingConfig;
use crate::models::regressor_trait::RegressionModel;

/// Cost recorded after the update of `iteration`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostSample {
    pub iteration: usize,
    pub cost: f64,
}

fn residuals(x: &Array2<f64>, y: &Array1<f64>, w: &Array1<f64>, b: f64) -> Array1<f64> {
    x.dot(w) + b - y
}

/// Regularised mean-squared-error cost.
pub fn compute_cost(x: &Array2<f64>, y: &Array1<f64>, w: &Array1<f64>, b: f64, lambda: f64) -> f64 {
    let m = x.nrows() as f64;
    let errors = residuals(x, y, w, b);
    let cost = errors.dot(&errors) / (2.0 * m);
    let reg_cost = (lambda / (2.0 * m)) * w.dot(w);
    cost + reg_cost
}

/// Gradient of [`compute_cost`] with respect to `w` and `b`.
pub fn compute_gradient(
    x: &Array2<f64>,
    y: &Array1<f64>,
    w: &Array1<f64>,
    b: f64,
    lambda: f64,
) -> (Array1<f64>, f64) {
    let m = x.nrows() as f64;
    let errors = residuals(x, y, w, b);
    let dj_dw = x.t().dot(&errors) / m + w * (lambda / m);
    let dj_db = errors.sum() / m;
    (dj_dw, dj_db)
}

/// Run exactly `config.num_iterations` simultaneous updates of `w` and `b`.
///
/// The cost is evaluated after every `cost_sample_interval`-th update and has
/// no influence on the descent. A learning rate that is too large makes the
/// cost diverge; that is reported in the log but not prevented.
pub fn gradient_descent(
    x: &Array2<f64>,
    y: &Array1<f64>,
    w_init: &Array1<f64>,
    b_init: f64,
    config: &TrainingConfig,
) -> (Array1<f64>, f64, Vec<CostSample>) {
    let mut w = w_init.clone();
    let mut b = b_init;
    let mut history = Vec::new();
    let mut warned_divergence = false;

    let alpha = config.learning_rate;
    for i in 0..config.num_iterations {
        let (dj_dw, dj_db) = compute_gradient(x, y, &w, b, config.lambda);
        w.scaled_add(-alpha, &dj_dw);
        b -= alpha * dj_db;

        if config.cost_sample_interval > 0 && i % config.cost_sample_interval == 0 {
            let cost = compute_cost(x, y, &w, b, config.lambda);
            history.push(CostSample { iteration: i, cost });
            log::debug!("Iteration {}: cost = {:.6}", i, cost);
            if config.cost_log_interval > 0 && i % config.cost_log_interval == 0 {
                log::info!("Iteration {}: Cost = {:.4}", i, cost);
            }
            if !cost.is_finite() && !warned_divergence {
                log::warn!(
                    "Cost became non-finite at iteration {}; the learning rate {} is likely too large",
                    i,
                    alpha
                );
                warned_divergence = true;
            }
        }
    }

    (w, b, history)
}

/// Ridge regressor with zero initialisation.
#[derive(Debug, Clone)]
pub struct RidgeRegressor {
    config: TrainingConfig,
    weights: Array1<f64>,
    bias: f64,
}

impl RidgeRegressor {
    pub fn new(config: TrainingConfig) -> Self {
        RidgeRegressor {
            config,
            weights: Array1::zeros(0),
            bias: 0.0,
        }
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn into_parameters(self) -> (Array1<f64>, f64) {
        (self.weights, self.bias)
    }
}

impl RegressionModel for RidgeRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Vec<CostSample> {
        log::info!(
            "Training ridge regression on {} x {} matrix (alpha = {}, lambda = {}, {} iterations)",
            x.nrows(),
            x.ncols(),
            self.config.learning_rate,
            self.config.lambda,
            self.config.num_iterations
        );
        let w_init = Array1::zeros(x.ncols());
        let (w, b, history) = gradient_descent(x, y, &w_init, 0.0, &self.config);
        if let Some(last) = history.last() {
            log::info!("Training complete! Final cost: {:.4}", last.cost);
        }
        self.weights = w;
        self.bias = b;
        history
    }

    fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        x.dot(&self.weights) + self.bias
    }

    fn name(&self) -> &str {
        "ridge"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn cost_at_zero_weights_is_half_mean_square() {
        let x = array![[1.0, 0.0], [0.0, 1.0]];
        let y = array![2.0, 4.0];
        let w = Array1::zeros(2);
        // (4 + 16) / (2 * 2)
        assert!((compute_cost(&x, &y, &w, 0.0, 1.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn regularization_adds_weight_penalty() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        let w = array![1.0];
        // perfect fit, only the penalty remains: lambda / (2m) * 1
        assert!((compute_cost(&x, &y, &w, 0.0, 0.5) - 0.125).abs() < 1e-12);
        let (dj_dw, dj_db) = compute_gradient(&x, &y, &w, 0.0, 0.5);
        assert!((dj_dw[0] - 0.25).abs() < 1e-12);
        assert_eq!(dj_db, 0.0);
    }

    #[test]
    fn gradient_matches_finite_difference() {
        let x = array![[0.5, -1.0, 2.0], [1.5, 0.0, -0.5], [-1.0, 2.0, 1.0], [0.0, 1.0, 0.0]];
        let y = array![1.0, -2.0, 3.0, 0.5];
        let w = array![0.2, -0.1, 0.4];
        let b = 0.3;
        let lambda = 0.7;
        let (dj_dw, dj_db) = compute_gradient(&x, &y, &w, b, lambda);

        let h = 1e-6;
        for j in 0..3 {
            let mut wp = w.clone();
            let mut wm = w.clone();
            wp[j] += h;
            wm[j] -= h;
            let numeric = (compute_cost(&x, &y, &wp, b, lambda) - compute_cost(&x, &y, &wm, b, lambda)) / (2.0 * h);
            assert!((numeric - dj_dw[j]).abs() < 1e-6, "dw[{}]: {} vs {}", j, numeric, dj_dw[j]);
        }
        let numeric_b = (compute_cost(&x, &y, &w, b + h, lambda) - compute_cost(&x, &y, &w, b - h, lambda)) / (2.0 * h);
        assert!((numeric_b - dj_db).abs() < 1e-6);
    }

    #[test]
    fn descent_recovers_linear_relation() {
        let x = array![[-1.0], [-0.5], [0.0], [0.5], [1.0]];
        let y = x.column(0).mapv(|v| 3.0 * v + 2.0);
        let config = TrainingConfig::new(0.1, 2000, 0.0);
        let mut model = RidgeRegressor::new(config);
        model.fit(&x, &y);
        assert!((model.weights()[0] - 3.0).abs() < 1e-6);
        assert!((model.bias() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn samples_cost_on_interval() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 2.0, 3.0];
        let config = TrainingConfig {
            num_iterations: 250,
            cost_sample_interval: 100,
            ..TrainingConfig::default()
        };
        let (_, _, history) = gradient_descent(&x, &y, &Array1::zeros(1), 0.0, &config);
        let iterations: Vec<usize> = history.iter().map(|s| s.iteration).collect();
        assert_eq!(iterations, vec![0, 100, 200]);
        assert!(history.windows(2).all(|w| w[1].cost <= w[0].cost));
    }

    #[test]
    fn zero_iterations_leave_zero_parameters() {
        let x = array![[1.0, 2.0]];
        let y = array![5.0];
        let config = TrainingConfig::new(0.01, 0, 0.1);
        let (w, b, history) = gradient_descent(&x, &y, &Array1::zeros(2), 0.0, &config);
        assert!(w.iter().all(|&v| v == 0.0));
        assert_eq!(b, 0.0);
        assert!(history.is_empty());
    }

    #[test]
    fn divergence_is_not_guarded() {
        let x = array![[10.0], [20.0], [30.0]];
        let y = array![1.0, 2.0, 3.0];
        let config = TrainingConfig {
            learning_rate: 10.0,
            num_iterations: 300,
            lambda: 0.0,
            cost_sample_interval: 1,
            cost_log_interval: 0,
        };
        let (_, _, history) = gradient_descent(&x, &y, &Array1::zeros(1), 0.0, &config);
        assert_eq!(history.len(), 300);
        let last = history.last().unwrap().cost;
        assert!(!last.is_finite() || last > history[0].cost);
    }

    #[test]
    fn fitted_regressor_predicts_rows() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];
        let mut model = RidgeRegressor::new(TrainingConfig::new(0.1, 5000, 0.0));
        model.fit(&x, &y);

        assert_eq!(model.name(), "ridge");
        let predictions = model.predict(&x);
        assert_eq!(predictions.len(), 4);
        for (p, t) in predictions.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-6, "{} vs {}", p, t);
        }
        let manual = x.dot(model.weights()) + model.bias();
        assert_eq!(predictions, manual);
    }
}
