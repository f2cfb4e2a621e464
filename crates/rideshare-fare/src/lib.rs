//! rideshare-fare: fare prediction from trip distance, surge, provider and tier.
//!
//! The crate fits an encoding schema (z-score statistics and categorical
//! vocabularies) on a cleaned trip dataset, expands each trip into a fixed
//! feature vector, and trains an L2-regularised linear model with batch
//! gradient descent. The trained weights and the schema travel together in a
//! [`bundle::ModelBundle`], which is the only state shared between training
//! and prediction.
//!
//! The two entry points used by the command line front-end are
//! [`pipeline::train`] and [`pipeline::predict`].
pub mod bundle;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod features;
pub mod io;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod report;

pub use bundle::ModelBundle;
pub use config::TrainingConfig;
pub use error::{FareError, Result};
pub use pipeline::{load_or_train, predict, train, TrainingOutcome};
