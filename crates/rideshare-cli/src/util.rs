use std::path::Path;

use anyhow::Result;

/// Trip tables are delimited by extension, so anything other than `.csv` or
/// `.tsv` is rejected before the reader opens it.
pub fn validate_trip_table<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    if !matches!(ext.as_deref(), Some("csv") | Some("tsv")) {
        anyhow::bail!("Trip table must be a .csv or .tsv file: {}", path.display());
    }
    if !path.is_file() {
        anyhow::bail!("Trip table not found: {}", path.display());
    }
    Ok(())
}

/// Input checks the model itself does not perform.
pub fn validate_trip_inputs(distance: f64, surge_multiplier: f64) -> Result<()> {
    if distance.is_nan() || distance <= 0.0 {
        anyhow::bail!("Distance must be positive (got {})", distance);
    }
    if surge_multiplier.is_nan() || surge_multiplier < 1.0 {
        anyhow::bail!("Surge multiplier must be >= 1.0 (got {})", surge_multiplier);
    }
    Ok(())
}
