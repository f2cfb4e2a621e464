//! Trip records as read from disk and the cleaned dataset used for fitting.
//!
//! `TripRecord` mirrors one raw row, with every numeric cell optional.
//! `TripDataset` holds only complete rows, in input order; that
//! order is what fixes the categorical vocabularies.
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// One raw row of the trip table. Numeric cells may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub distance: Option<f64>,
    pub surge_multiplier: Option<f64>,
    pub cab_type: String,
    pub ride_name: String,
    pub price: Option<f64>,
}

/// A complete, labelled training row.
#[derive(Debug, Clone, PartialEq)]
pub struct TripExample {
    pub distance: f64,
    pub surge_multiplier: f64,
    pub cab_type: String,
    pub ride_name: String,
    pub price: f64,
}

/// The inputs of a single fare prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareQuery {
    pub distance: f64,
    pub surge_multiplier: f64,
    pub cab_type: String,
    pub ride_name: String,
}

impl FareQuery {
    pub fn new(
        distance: f64,
        surge_multiplier: f64,
        cab_type: impl Into<String>,
        ride_name: impl Into<String>,
    ) -> Self {
        Self {
            distance,
            surge_multiplier,
            cab_type: cab_type.into(),
            ride_name: ride_name.into(),
        }
    }
}

impl TripExample {
    pub fn new(
        distance: f64,
        surge_multiplier: f64,
        cab_type: impl Into<String>,
        ride_name: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            distance,
            surge_multiplier,
            cab_type: cab_type.into(),
            ride_name: ride_name.into(),
            price,
        }
    }
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl TripRecord {
    /// Returns the complete example, or `None` if distance, surge or price is missing.
    pub fn into_example(self) -> Option<TripExample> {
        Some(TripExample {
            distance: present(self.distance)?,
            surge_multiplier: present(self.surge_multiplier)?,
            price: present(self.price)?,
            cab_type: self.cab_type,
            ride_name: self.ride_name,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TripDataset {
    examples: Vec<TripExample>,
}

impl TripDataset {
    /// Wrap rows that are already known to be complete.
    pub fn new(examples: Vec<TripExample>) -> Self {
        TripDataset { examples }
    }

    /// Build a dataset from raw rows, dropping any row with a missing
    /// distance, surge multiplier or price. Row order is preserved.
    pub fn from_records(records: Vec<TripRecord>) -> Self {
        let total = records.len();
        let examples: Vec<TripExample> = records
            .into_iter()
            .filter_map(TripRecord::into_example)
            .collect();

        let dropped = total - examples.len();
        if dropped > 0 {
            log::warn!(
                "Dropped {} of {} trip rows with missing distance, surge_multiplier or price",
                dropped,
                total
            );
        }

        TripDataset { examples }
    }

    pub fn examples(&self) -> &[TripExample] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn labels(&self) -> Array1<f64> {
        self.examples.iter().map(|e| e.price).collect()
    }

    pub fn log_input_data_summary(&self) {
        let mut cab_types: Vec<&str> = Vec::new();
        for example in &self.examples {
            if !cab_types.contains(&example.cab_type.as_str()) {
                cab_types.push(&example.cab_type);
            }
        }
        log::info!("----- Trip Data Summary -----");
        log::info!("{} trips across cab types {:?}", self.len(), cab_types);
        log::info!("-----------------------------");
    }
}

impl FromIterator<TripExample> for TripDataset {
    fn from_iter<I: IntoIterator<Item = TripExample>>(iter: I) -> Self {
        TripDataset::new(iter.into_iter().collect())
    }
}
