use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{
    check_species_code, coefficients_not_found, mapping_not_found, species_not_found,
    CoefficientStore, RegionSpeciesMapping,
};
use crate::error::EstimatorError;
use crate::models::{SpeciesRecord, VolumeCoefficients};
use crate::volume::normalize_region;

/// Reference data held in memory, loadable from a JSON document with
/// `species`, `config` and `coefficients` arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub species: Vec<SpeciesRecord>,
    #[serde(default)]
    pub config: Vec<RegionSpeciesMapping>,
    #[serde(default)]
    pub coefficients: Vec<VolumeCoefficients>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_species(mut self, species: SpeciesRecord) -> Self {
        self.species.push(species);
        self
    }

    pub fn with_mapping(mut self, species_cd: i64, region: &str, eff_species_cd: i64) -> Self {
        let seq = self.config.len() as i64;
        self.config.push(RegionSpeciesMapping {
            species_cd,
            region: region.to_string(),
            eff_species_cd,
            seq,
        });
        self
    }

    pub fn with_coefficients(mut self, row: VolumeCoefficients) -> Self {
        self.coefficients.push(row);
        self
    }

    pub fn from_json_str(content: &str) -> Result<Self, EstimatorError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EstimatorError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }
}

impl CoefficientStore for MemoryStore {
    fn species(&self, species_cd: i64) -> Result<SpeciesRecord, EstimatorError> {
        check_species_code(species_cd)?;
        trace!(species = species_cd, "species lookup (memory)");
        self.species
            .iter()
            .find(|s| s.species_cd == species_cd)
            .cloned()
            .ok_or_else(|| species_not_found(species_cd))
    }

    fn region_species(&self, species_cd: i64, region: &str) -> Result<i64, EstimatorError> {
        check_species_code(species_cd)?;
        self.config
            .iter()
            .filter(|c| c.species_cd == species_cd && normalize_region(&c.region) == region)
            .min_by_key(|c| c.seq)
            .map(|c| c.eff_species_cd)
            .ok_or_else(|| mapping_not_found(species_cd, region))
    }

    fn volume_coefficients(
        &self,
        eff_species_cd: i64,
        region: &str,
    ) -> Result<VolumeCoefficients, EstimatorError> {
        self.coefficients
            .iter()
            .find(|c| c.eff_species_cd == eff_species_cd && normalize_region(&c.region) == region)
            .cloned()
            .ok_or_else(|| coefficients_not_found(eff_species_cd, region))
    }
}
