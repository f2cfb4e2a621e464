//! The persisted unit of trained state: weights, bias and encoding schema.
//!
//! A bundle is written once and never edited. Retraining produces a new
//! bundle that replaces the file atomically, so a concurrent reader sees
//! either the old pair of schema and weights or the new one.
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use atomicwrites::{AtomicFile, OverwriteBehavior};
use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data_handling::FareQuery;
use crate::error::{FareError, Result};
use crate::features::FeatureEncoder;
use crate::preprocessing::FeatureSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub schema: FeatureSchema,
    /// Column labels in encoding order; informational only.
    #[serde(default)]
    pub feature_names: Vec<String>,
    /// RFC 3339 time of the training run.
    #[serde(default)]
    pub trained_at: Option<String>,
}

impl ModelBundle {
    pub fn new(weights: Array1<f64>, bias: f64, schema: FeatureSchema) -> Self {
        let feature_names = FeatureEncoder::new(&schema).feature_names();
        ModelBundle {
            weights: weights.to_vec(),
            bias,
            schema,
            feature_names,
            trained_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn encoder(&self) -> FeatureEncoder<'_> {
        FeatureEncoder::new(&self.schema)
    }

    /// `w · features + b` without clamping.
    pub fn predict_raw(
        &self,
        distance: f64,
        surge_multiplier: f64,
        cab_type: &str,
        ride_name: &str,
    ) -> f64 {
        let features = self
            .encoder()
            .encode(distance, surge_multiplier, cab_type, ride_name);
        features
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.bias
    }

    /// Predicted fare, clamped at zero. Unknown cab types or ride names
    /// contribute nothing; inputs are not validated here.
    pub fn predict(
        &self,
        distance: f64,
        surge_multiplier: f64,
        cab_type: &str,
        ride_name: &str,
    ) -> f64 {
        self.predict_raw(distance, surge_multiplier, cab_type, ride_name)
            .max(0.0)
    }

    pub fn predict_query(&self, query: &FareQuery) -> f64 {
        self.predict(
            query.distance,
            query.surge_multiplier,
            &query.cab_type,
            &query.ride_name,
        )
    }

    /// Predict many queries in parallel against this read-only bundle.
    pub fn predict_batch(&self, queries: &[FareQuery]) -> Vec<f64> {
        queries.par_iter().map(|q| self.predict_query(q)).collect()
    }

    /// Whether a bundle file is present at `path`.
    pub fn exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    /// Whether every weight and the bias are finite.
    pub fn is_finite(&self) -> bool {
        self.bias.is_finite() && self.weights.iter().all(|w| w.is_finite())
    }

    /// Serialize to JSON and atomically replace `path`. A bundle with
    /// non-finite parameters is rejected and any existing file is left as is.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !self.is_finite() {
            log::error!(
                "Not writing {}: model parameters diverged during training",
                path.display()
            );
            return Err(FareError::NonFiniteParameters);
        }
        log::debug!("Writing model bundle to {}", path.display());
        AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
            .write(|f| serde_json::to_writer_pretty(f, self))
            .map_err(|e| match e {
                atomicwrites::Error::Internal(source) => FareError::Io {
                    path: path.to_path_buf(),
                    source,
                },
                atomicwrites::Error::User(e) => FareError::Serialization(e),
            })?;
        log::info!("Model bundle saved to {}", path.display());
        Ok(())
    }

    /// Load a bundle, failing with [`FareError::MissingBundle`] if none exists.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => FareError::MissingBundle {
                path: path.to_path_buf(),
            },
            _ => FareError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let bundle: ModelBundle = serde_json::from_reader(BufReader::new(file))?;

        let expected = bundle.schema.dimension();
        if bundle.weights.len() != expected {
            return Err(FareError::DimensionMismatch {
                expected,
                found: bundle.weights.len(),
            });
        }
        log::debug!(
            "Loaded model bundle from {} ({} features)",
            path.display(),
            expected
        );
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> ModelBundle {
        let schema = FeatureSchema {
            feature_means: [3.0, 1.2],
            feature_stds: [1.5, 0.3],
            cab_vocabulary: vec!["Uber".into(), "Lyft".into()],
            ride_vocabulary: vec!["UberX".into(), "Lyft".into()],
        };
        let weights = Array1::from_vec(vec![4.0, 2.0, -0.5, 0.1, 0.2, 1.0, -1.0, 0.0, 3.0]);
        ModelBundle::new(weights, 15.0, schema)
    }

    #[test]
    fn predict_adds_bias_to_dot_product() {
        let b = bundle();
        // distance and surge at their means: only bias and one-hot weights remain
        let fare = b.predict(3.0, 1.2, "Uber", "Lyft");
        assert!((fare - (15.0 + 1.0 + 3.0)).abs() < 1e-12);
    }

    #[test]
    fn negative_raw_prediction_is_clamped() {
        let b = bundle();
        // normalized distance = -10, dominates the linear term
        let raw = b.predict_raw(-12.0, 1.2, "Lyft", "UberX");
        assert!(raw < 0.0);
        assert_eq!(b.predict(-12.0, 1.2, "Lyft", "UberX"), 0.0);
    }

    #[test]
    fn batch_matches_single() {
        let b = bundle();
        let queries = vec![
            FareQuery::new(1.0, 1.0, "Uber", "UberX"),
            FareQuery::new(5.0, 2.0, "Lyft", "Lyft"),
            FareQuery::new(2.5, 1.1, "Taxi", "Shared"),
        ];
        let batch = b.predict_batch(&queries);
        for (q, p) in queries.iter().zip(batch) {
            assert_eq!(p, b.predict_query(q));
        }
    }

    #[test]
    fn non_finite_bundle_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let good = bundle();
        good.save(&path).unwrap();

        let mut diverged = bundle();
        diverged.weights[2] = f64::NAN;
        assert!(!diverged.is_finite());
        assert!(matches!(
            diverged.save(&path),
            Err(FareError::NonFiniteParameters)
        ));

        let mut infinite_bias = bundle();
        infinite_bias.bias = f64::INFINITY;
        assert!(infinite_bias.save(&path).is_err());

        assert_eq!(ModelBundle::load(&path).unwrap(), good);
    }

    #[test]
    fn load_of_absent_file_is_missing_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelBundle::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, FareError::MissingBundle { .. }));
    }

    #[test]
    fn feature_names_follow_layout() {
        let b = bundle();
        assert_eq!(
            b.feature_names,
            vec![
                "distance",
                "surge_multiplier",
                "distance²",
                "surge²",
                "distance×surge",
                "cab_Uber",
                "cab_Lyft",
                "ride_UberX",
                "ride_Lyft",
            ]
        );
    }
}
