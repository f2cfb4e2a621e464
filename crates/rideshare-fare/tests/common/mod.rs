#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use rideshare_fare::data_handling::{TripDataset, TripExample};

/// (cab_type, ride_name, base fare, per-mile rate)
pub const PRODUCTS: [(&str, &str, f64, f64); 3] = [
    ("Uber", "UberX", 6.0, 2.0),
    ("Lyft", "Lyft", 5.0, 1.8),
    ("Uber", "UberXL", 9.0, 2.8),
];

const SURGES: [f64; 4] = [1.0, 1.25, 1.5, 2.0];

/// Deterministic synthetic trips where the fare grows with distance and surge.
pub fn synthetic_examples(n: usize) -> Vec<TripExample> {
    (0..n)
        .map(|i| {
            let (cab, ride, base, rate) = PRODUCTS[i % PRODUCTS.len()];
            let distance = 0.5 + ((i * 7) % 23) as f64 * 0.3;
            let surge = SURGES[(i / 3) % SURGES.len()];
            let price = (base + rate * distance) * surge;
            TripExample::new(distance, surge, cab, ride, price)
        })
        .collect()
}

pub fn synthetic_dataset(n: usize) -> TripDataset {
    TripDataset::new(synthetic_examples(n))
}

/// Write the synthetic trips as a CSV table with an extra unused column.
pub fn write_synthetic_csv(dir: &Path, n: usize) -> PathBuf {
    let path = dir.join("rideshare.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "id,cab_type,name,distance,surge_multiplier,price").unwrap();
    for (i, e) in synthetic_examples(n).iter().enumerate() {
        writeln!(
            f,
            "{},{},{},{},{},{}",
            i, e.cab_type, e.ride_name, e.distance, e.surge_multiplier, e.price
        )
        .unwrap();
    }
    // a row with a missing price is dropped before fitting
    writeln!(f, "{},Lyft,Lyft,2.0,1.0,", n).unwrap();
    path
}
