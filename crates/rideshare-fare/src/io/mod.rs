//! Reading trip tables and writing prediction tables.

pub mod trip_table;

pub use trip_table::{
    read_fare_queries, read_trip_dataset, read_trip_records, write_predictions, write_predictions_to,
    DatasetColumns,
};
