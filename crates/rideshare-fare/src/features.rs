//! Feature encoding shared by training and prediction.
//!
//! Column layout, for a schema with C cab types and R ride names:
//!
//! | columns         | content                                          |
//! |-----------------|--------------------------------------------------|
//! | `0..2`          | normalized distance, normalized surge            |
//! | `2..5`          | distance², surge², distance×surge (normalized)   |
//! | `5..5+C`        | cab type one-hot, in vocabulary order            |
//! | `5+C..5+C+R`    | ride name one-hot, in vocabulary order           |
//!
//! Both the batch and the single-row path go through [`FeatureEncoder::encode_into`],
//! so the layout has exactly one definition. A category absent from the
//! vocabulary leaves its whole one-hot block at zero.
use std::ops::Range;

use ndarray::{Array1, Array2, ArrayViewMut1};

use crate::data_handling::TripDataset;
use crate::preprocessing::{FeatureSchema, NUMERIC_FEATURES, POLYNOMIAL_FEATURES};

#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder<'a> {
    schema: &'a FeatureSchema,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(schema: &'a FeatureSchema) -> Self {
        FeatureEncoder { schema }
    }

    pub fn dimension(&self) -> usize {
        self.schema.dimension()
    }

    pub fn numeric_columns(&self) -> Range<usize> {
        0..NUMERIC_FEATURES.len()
    }

    pub fn polynomial_columns(&self) -> Range<usize> {
        let start = self.numeric_columns().end;
        start..start + POLYNOMIAL_FEATURES
    }

    pub fn cab_columns(&self) -> Range<usize> {
        let start = self.polynomial_columns().end;
        start..start + self.schema.cab_vocabulary.len()
    }

    pub fn ride_columns(&self) -> Range<usize> {
        let start = self.cab_columns().end;
        start..start + self.schema.ride_vocabulary.len()
    }

    /// Human readable label for every column, in layout order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect();
        names.extend(
            ["distance²", "surge²", "distance×surge"]
                .iter()
                .map(|s| s.to_string()),
        );
        names.extend(self.schema.cab_vocabulary.iter().map(|v| format!("cab_{}", v)));
        names.extend(self.schema.ride_vocabulary.iter().map(|v| format!("ride_{}", v)));
        names
    }

    /// Write the encoding of one trip into `out`, which must have length N.
    pub fn encode_into(
        &self,
        distance: f64,
        surge_multiplier: f64,
        cab_type: &str,
        ride_name: &str,
        mut out: ArrayViewMut1<f64>,
    ) {
        debug_assert_eq!(out.len(), self.dimension());
        out.fill(0.0);

        let (d, s) = self.schema.normalize(distance, surge_multiplier);
        out[0] = d;
        out[1] = s;

        let poly = self.polynomial_columns().start;
        out[poly] = d * d;
        out[poly + 1] = s * s;
        out[poly + 2] = d * s;

        if let Some(idx) = self.schema.cab_index(cab_type) {
            out[self.cab_columns().start + idx] = 1.0;
        }
        if let Some(idx) = self.schema.ride_index(ride_name) {
            out[self.ride_columns().start + idx] = 1.0;
        }
    }

    /// Single mode: the N-length feature vector of one trip.
    pub fn encode(
        &self,
        distance: f64,
        surge_multiplier: f64,
        cab_type: &str,
        ride_name: &str,
    ) -> Array1<f64> {
        let mut features = Array1::zeros(self.dimension());
        self.encode_into(distance, surge_multiplier, cab_type, ride_name, features.view_mut());
        features
    }

    /// Batch mode: the m × N training matrix, one row per example in dataset order.
    pub fn encode_batch(&self, dataset: &TripDataset) -> Array2<f64> {
        let mut x = Array2::zeros((dataset.len(), self.dimension()));
        for (row, example) in x.rows_mut().into_iter().zip(dataset.examples()) {
            self.encode_into(
                example.distance,
                example.surge_multiplier,
                &example.cab_type,
                &example.ride_name,
                row,
            );
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema {
            feature_means: [2.0, 1.0],
            feature_stds: [2.0, 0.5],
            cab_vocabulary: vec!["Uber".into(), "Lyft".into()],
            ride_vocabulary: vec!["UberX".into(), "Lyft".into(), "UberXL".into()],
        }
    }

    #[test]
    fn layout_ranges_tile_the_vector() {
        let schema = schema();
        let enc = FeatureEncoder::new(&schema);
        assert_eq!(enc.numeric_columns(), 0..2);
        assert_eq!(enc.polynomial_columns(), 2..5);
        assert_eq!(enc.cab_columns(), 5..7);
        assert_eq!(enc.ride_columns(), 7..10);
        assert_eq!(enc.dimension(), 10);
        assert_eq!(enc.feature_names().len(), 10);
    }

    #[test]
    fn single_row_values() {
        let schema = schema();
        let enc = FeatureEncoder::new(&schema);
        let v = enc.encode(6.0, 1.5, "Lyft", "UberXL");
        // normalized: (6 - 2) / 2 = 2, (1.5 - 1) / 0.5 = 1
        assert_eq!(
            v.to_vec(),
            vec![2.0, 1.0, 4.0, 1.0, 2.0, 0.0, 1.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn unknown_category_zeroes_block() {
        let schema = schema();
        let enc = FeatureEncoder::new(&schema);
        let v = enc.encode(2.0, 1.0, "Via", "Pool");
        assert!(v.iter().all(|&x| x == 0.0));
    }
}
