mod memory;
mod sqlite;

use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;
use crate::models::{SpeciesRecord, VolumeCoefficients};

pub use memory::MemoryStore;
pub use sqlite::{ImportCounts, SqliteStore};

/// One row of the `config` relation: which coefficient species a raw
/// species code uses within a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpeciesMapping {
    pub species_cd: i64,
    pub region: String,
    pub eff_species_cd: i64,
    /// Ordering among several rows for the same key; lowest wins.
    #[serde(default)]
    pub seq: i64,
}

/// Read-only access to the coefficient reference data.
pub trait CoefficientStore {
    /// Species record by code. `ValidationError` for non-positive codes,
    /// `NotFound` when absent.
    fn species(&self, species_cd: i64) -> Result<SpeciesRecord, EstimatorError>;

    /// Effective species code used for volume rows in `region`.
    fn region_species(&self, species_cd: i64, region: &str) -> Result<i64, EstimatorError>;

    /// Volume coefficient row for an effective species code in `region`.
    fn volume_coefficients(
        &self,
        eff_species_cd: i64,
        region: &str,
    ) -> Result<VolumeCoefficients, EstimatorError>;
}

pub(crate) fn check_species_code(species_cd: i64) -> Result<(), EstimatorError> {
    if species_cd <= 0 {
        return Err(EstimatorError::ValidationError(format!(
            "Species code must be a positive integer, got {species_cd}"
        )));
    }
    Ok(())
}

pub(crate) fn species_not_found(species_cd: i64) -> EstimatorError {
    EstimatorError::NotFound(format!("species {species_cd}"))
}

pub(crate) fn mapping_not_found(species_cd: i64, region: &str) -> EstimatorError {
    EstimatorError::NotFound(format!(
        "region species mapping for species {species_cd} in region '{region}'"
    ))
}

pub(crate) fn coefficients_not_found(eff_species_cd: i64, region: &str) -> EstimatorError {
    EstimatorError::NotFound(format!(
        "volume coefficients for species {eff_species_cd} in region '{region}'"
    ))
}
