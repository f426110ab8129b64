mod csv_io;
mod json_io;

use std::path::Path;

use tracing::debug;

use crate::error::EstimatorError;
use crate::models::{TreeEstimate, TreeRecord};
use crate::store::MemoryStore;

pub use csv_io::{
    estimates_to_csv_string, read_coefficients_csv, read_config_csv, read_species_csv,
    read_trees_csv, read_trees_csv_from_bytes, write_estimates_csv,
};
pub use json_io::{
    estimates_to_json_string, read_trees_json, read_trees_json_from_str, write_estimates_json,
};

/// File names expected by [`load_reference_dir`].
pub const SPECIES_FILE: &str = "species.csv";
pub const CONFIG_FILE: &str = "config.csv";
pub const COEFFICIENTS_FILE: &str = "volume_coefficients.csv";

/// Trait for reading tree records from a file.
pub trait TreeReader {
    fn read(&self, path: &Path) -> Result<Vec<TreeRecord>, EstimatorError>;
}

/// Trait for writing tree estimates to a file.
pub trait EstimateWriter {
    fn write(&self, estimates: &[TreeEstimate], path: &Path) -> Result<(), EstimatorError>;
}

/// CSV format reader/writer.
pub struct CsvFormat;

impl TreeReader for CsvFormat {
    fn read(&self, path: &Path) -> Result<Vec<TreeRecord>, EstimatorError> {
        read_trees_csv(path)
    }
}

impl EstimateWriter for CsvFormat {
    fn write(&self, estimates: &[TreeEstimate], path: &Path) -> Result<(), EstimatorError> {
        write_estimates_csv(estimates, path)
    }
}

/// JSON format reader/writer.
#[derive(Default)]
pub struct JsonFormat {
    pub pretty: bool,
}

impl TreeReader for JsonFormat {
    fn read(&self, path: &Path) -> Result<Vec<TreeRecord>, EstimatorError> {
        read_trees_json(path)
    }
}

impl EstimateWriter for JsonFormat {
    fn write(&self, estimates: &[TreeEstimate], path: &Path) -> Result<(), EstimatorError> {
        write_estimates_json(estimates, path, self.pretty)
    }
}

/// Read tree records, choosing the format from the file extension.
pub fn read_trees(path: &Path) -> Result<Vec<TreeRecord>, EstimatorError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("csv") => CsvFormat.read(path),
        Some("json") => JsonFormat::default().read(path),
        _ => Err(EstimatorError::ValidationError(format!(
            "Unsupported tree file format: '{}'. Supported: .csv, .json",
            path.display()
        ))),
    }
}

/// Load reference data from a directory holding `species.csv`,
/// `config.csv` and `volume_coefficients.csv`. Missing files are skipped.
pub fn load_reference_dir(dir: &Path) -> Result<MemoryStore, EstimatorError> {
    if !dir.is_dir() {
        return Err(EstimatorError::NotFound(format!(
            "reference directory '{}'",
            dir.display()
        )));
    }
    let mut store = MemoryStore::new();
    let species = dir.join(SPECIES_FILE);
    if species.exists() {
        store.species = read_species_csv(&species)?;
    }
    let config = dir.join(CONFIG_FILE);
    if config.exists() {
        store.config = read_config_csv(&config)?;
    }
    let coefficients = dir.join(COEFFICIENTS_FILE);
    if coefficients.exists() {
        store.coefficients = read_coefficients_csv(&coefficients)?;
    }
    debug!(
        dir = %dir.display(),
        species = store.species.len(),
        config = store.config.len(),
        coefficients = store.coefficients.len(),
        "loaded reference directory"
    );
    Ok(store)
}
