pub mod regressor_trait;
pub mod ridge;

pub use regressor_trait::RegressionModel;
pub use ridge::{compute_cost, compute_gradient, gradient_descent, CostSample, RidgeRegressor};
