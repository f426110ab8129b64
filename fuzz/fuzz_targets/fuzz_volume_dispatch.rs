#![no_main]

use libfuzzer_sys::fuzz_target;
use tree_estimator::models::{Measurement, VolumeCoefficients};
use tree_estimator::volume::estimate_volume;

const REGIONS: &[&str] = &[
    "S24", "S33", "S23LCS", "S23LPS", "S22LAZN", "S22LUT", "S26LCA", "S26LORW", "S26LWAE",
    "S27LAK", "S99",
];

fn value(bytes: &[u8], i: usize) -> Option<f64> {
    let chunk = bytes.get(i * 4..i * 4 + 4)?;
    let raw = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    Some((raw % 200_000) as f64 / 1000.0)
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    let region = REGIONS[data[0] as usize % REGIONS.len()];
    let species = u16::from_le_bytes([data[1], data[2]]) as i64;
    let rest = &data[3..];

    let mut m = Measurement::new();
    m.dbh = value(rest, 0);
    m.height = value(rest, 1);
    m.basal_area = value(rest, 2);
    m.site_index = value(rest, 3);
    m.drc = value(rest, 4);
    m.bole_height = value(rest, 5);
    m.stems = value(rest, 6).map(|v| v as u32 + 1);

    let coefs: Vec<f64> = (7..27).filter_map(|i| value(rest, i)).map(|v| v - 100.0).collect();
    let row = VolumeCoefficients::from_values(region, species, &coefs);

    if let Ok(est) = estimate_volume(region, species, &row, &m) {
        assert!(est.gross_volume_cuft.is_finite() && est.gross_volume_cuft > 0.0);
    }
});
