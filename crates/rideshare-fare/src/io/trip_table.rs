//! CSV/TSV trip table reader.
//!
//! The expected columns are `distance`, `surge_multiplier`, `cab_type`, `name`
//! and `price`; any other column is ignored. Header matching is
//! case-insensitive.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::data_handling::{FareQuery, TripDataset, TripRecord};

/// Column names of a trip table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetColumns {
    pub distance: String,
    pub surge_multiplier: String,
    pub cab_type: String,
    pub ride_name: String,
    pub price: String,
}

impl Default for DatasetColumns {
    fn default() -> Self {
        Self {
            distance: "distance".to_string(),
            surge_multiplier: "surge_multiplier".to_string(),
            cab_type: "cab_type".to_string(),
            ride_name: "name".to_string(),
            price: "price".to_string(),
        }
    }
}

fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open trip table: {}", path.display()))
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

fn require_column(headers: &StringRecord, name: &str) -> Result<usize> {
    find_column(headers, name).ok_or_else(|| anyhow!("Missing required column '{}'", name))
}

/// Parse a numeric cell. Empty, `NA`, `NaN`, `null`, infinite or otherwise
/// unparsable cells are missing values.
fn parse_cell(record: &StringRecord, idx: usize) -> Option<f64> {
    let value = record.get(idx)?.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn text_cell(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or_default().trim().to_string()
}

/// Read every row of a trip table, keeping missing numeric cells as `None`.
pub fn read_trip_records<P: AsRef<Path>>(path: P, columns: &DatasetColumns) -> Result<Vec<TripRecord>> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .context("Failed to read trip table header row")?
        .clone();

    let distance_idx = require_column(&headers, &columns.distance)?;
    let surge_idx = require_column(&headers, &columns.surge_multiplier)?;
    let cab_idx = require_column(&headers, &columns.cab_type)?;
    let ride_idx = require_column(&headers, &columns.ride_name)?;
    let price_idx = require_column(&headers, &columns.price)?;

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        records.push(TripRecord {
            distance: parse_cell(&record, distance_idx),
            surge_multiplier: parse_cell(&record, surge_idx),
            cab_type: text_cell(&record, cab_idx),
            ride_name: text_cell(&record, ride_idx),
            price: parse_cell(&record, price_idx),
        });
    }

    log::info!("Read {} trip rows from {}", records.len(), path.display());
    Ok(records)
}

/// Read a trip table and drop incomplete rows.
pub fn read_trip_dataset<P: AsRef<Path>>(path: P, columns: &DatasetColumns) -> Result<TripDataset> {
    let records = read_trip_records(path, columns)?;
    Ok(TripDataset::from_records(records))
}

/// Read prediction inputs. The price column is not required. Rows with a
/// missing distance or surge multiplier are errors, since there is nothing to
/// predict from.
pub fn read_fare_queries<P: AsRef<Path>>(path: P, columns: &DatasetColumns) -> Result<Vec<FareQuery>> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .context("Failed to read query table header row")?
        .clone();

    let distance_idx = require_column(&headers, &columns.distance)?;
    let surge_idx = require_column(&headers, &columns.surge_multiplier)?;
    let cab_idx = require_column(&headers, &columns.cab_type)?;
    let ride_idx = require_column(&headers, &columns.ride_name)?;

    let mut queries = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        let distance = parse_cell(&record, distance_idx)
            .ok_or_else(|| anyhow!("Missing or invalid distance at row {}", row_idx + 1))?;
        let surge_multiplier = parse_cell(&record, surge_idx)
            .ok_or_else(|| anyhow!("Missing or invalid surge_multiplier at row {}", row_idx + 1))?;
        queries.push(FareQuery {
            distance,
            surge_multiplier,
            cab_type: text_cell(&record, cab_idx),
            ride_name: text_cell(&record, ride_idx),
        });
    }
    Ok(queries)
}

/// Write queries and their predicted fares to CSV or TSV, chosen by extension.
pub fn write_predictions<P: AsRef<Path>>(
    path: P,
    queries: &[FareQuery],
    predictions: &[f64],
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_predictions_to(BufWriter::new(file), delimiter_for(path), queries, predictions)
}

/// Write queries and their predicted fares (rounded to cents) to any writer.
pub fn write_predictions_to<W: Write>(
    writer: W,
    delimiter: u8,
    queries: &[FareQuery],
    predictions: &[f64],
) -> Result<()> {
    if queries.len() != predictions.len() {
        anyhow::bail!(
            "{} queries but {} predictions",
            queries.len(),
            predictions.len()
        );
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    writer.write_record(["distance", "surge_multiplier", "cab_type", "name", "predicted_price"])?;
    for (query, price) in queries.iter().zip(predictions) {
        writer.write_record(&[
            query.distance.to_string(),
            query.surge_multiplier.to_string(),
            query.cab_type.clone(),
            query.ride_name.clone(),
            format!("{:.2}", price),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_missing_cells_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "trips.csv",
            "id,distance,cab_type,name,price,surge_multiplier\n\
             a,1.5,Uber,UberX,9.5,1.0\n\
             b,,Lyft,Lyft,7.0,1.0\n\
             c,2.0,Lyft,Lux,NaN,1.25\n",
        );
        let records = read_trip_records(&path, &DatasetColumns::default()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].distance, Some(1.5));
        assert_eq!(records[0].ride_name, "UberX");
        assert_eq!(records[1].distance, None);
        assert_eq!(records[2].price, None);

        let dataset = read_trip_dataset(&path, &DatasetColumns::default()).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn missing_value_markers_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "trips.csv",
            "distance,surge_multiplier,cab_type,name,price\n\
             NA,1.0,Uber,UberX,9.5\n\
             1.0,null,Uber,UberX,9.5\n\
             1.0,1.0,Uber,UberX,inf\n\
             abc,1.0,Lyft,Lyft,7.0\n\
             2.0,-inf,Lyft,Lyft,7.0\n\
             1.0,1.0,Lyft,Lyft,abc\n\
             2.5,1.5,Lyft,Lyft,12.0\n",
        );
        let records = read_trip_records(&path, &DatasetColumns::default()).unwrap();
        assert_eq!(records.len(), 7);
        assert_eq!(records[0].distance, None);
        assert_eq!(records[1].surge_multiplier, None);
        assert_eq!(records[2].price, None);
        assert_eq!(records[3].distance, None);
        assert_eq!(records[4].surge_multiplier, None);
        assert_eq!(records[5].price, None);
        assert!(records[..6].iter().all(|r| r.clone().into_example().is_none()));

        let dataset = read_trip_dataset(&path, &DatasetColumns::default()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.examples()[0].distance, 2.5);
        assert_eq!(dataset.examples()[0].price, 12.0);
    }

    #[test]
    fn tsv_is_detected_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "trips.tsv",
            "distance\tsurge_multiplier\tcab_type\tname\tprice\n3.0\t1.5\tUber\tUberXL\t30.0\n",
        );
        let records = read_trip_records(&path, &DatasetColumns::default()).unwrap();
        assert_eq!(records[0].surge_multiplier, Some(1.5));
        assert_eq!(records[0].cab_type, "Uber");
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "trips.csv", "distance,cab_type,name,price\n1.0,Uber,UberX,5.0\n");
        let err = read_trip_records(&path, &DatasetColumns::default()).unwrap_err();
        assert!(format!("{}", err).contains("surge_multiplier"));
    }

    #[test]
    fn queries_do_not_need_price() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "queries.csv",
            "distance,surge_multiplier,cab_type,name\n5.0,1.5,Uber,UberXL\n",
        );
        let queries = read_fare_queries(&path, &DatasetColumns::default()).unwrap();
        assert_eq!(queries, vec![FareQuery::new(5.0, 1.5, "Uber", "UberXL")]);

        let out = dir.path().join("out.csv");
        write_predictions(&out, &queries, &[23.456]).unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("distance,surge_multiplier,cab_type,name,predicted_price"));
        assert!(written.contains("23.46"));
    }
}
