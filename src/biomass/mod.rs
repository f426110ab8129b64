mod jenkins;
mod stump;

use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;
use crate::models::{BiomassComponent, SpeciesRecord};

pub use jenkins::{
    bole_biomass, component_biomass, component_ratio, species_ratio, total_above_ground_biomass,
    CM_PER_INCH, LBS_PER_KG,
};
pub use stump::{
    relative_stump_diameter, stump_biomass, stump_diameter_inside_bark,
    stump_diameter_outside_bark, stump_volume_inside_bark, stump_volume_outside_bark, taper_antiderivative,
    taper_integral, StumpAdjustment, WATER_LBS_PER_CUFT,
};

/// Top and branch biomass in pounds: what remains of total above-ground
/// biomass after stem wood, stem bark, foliage and stump are removed.
pub fn top_biomass(
    species: &SpeciesRecord,
    dbh: f64,
    height: f64,
    adjustment: StumpAdjustment,
) -> Result<f64, EstimatorError> {
    if !height.is_finite() || height <= 0.0 {
        return Err(EstimatorError::ValidationError(format!(
            "Height must be a positive number, got {height}"
        )));
    }
    Ok(top_remainder(
        total_above_ground_biomass(species, dbh)?,
        component_biomass(species, dbh, BiomassComponent::Stem)?,
        component_biomass(species, dbh, BiomassComponent::Bark)?,
        component_biomass(species, dbh, BiomassComponent::Foliage)?,
        stump_biomass(species, dbh, adjustment)?,
    ))
}

/// Top biomass from parts that have already been computed.
pub fn top_remainder(total: f64, stem: f64, bark: f64, foliage: f64, stump: f64) -> f64 {
    total - stem - bark - foliage - stump
}

/// Every biomass component for one tree, in pounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomassBreakdown {
    pub total: f64,
    pub stem: f64,
    pub bark: f64,
    pub foliage: f64,
    pub root: f64,
    pub stump: f64,
    pub top: f64,
}

impl BiomassBreakdown {
    pub fn compute(
        species: &SpeciesRecord,
        dbh: f64,
        height: f64,
        adjustment: StumpAdjustment,
    ) -> Result<Self, EstimatorError> {
        Ok(Self {
            total: total_above_ground_biomass(species, dbh)?,
            stem: component_biomass(species, dbh, BiomassComponent::Stem)?,
            bark: component_biomass(species, dbh, BiomassComponent::Bark)?,
            foliage: component_biomass(species, dbh, BiomassComponent::Foliage)?,
            root: component_biomass(species, dbh, BiomassComponent::Root)?,
            stump: stump_biomass(species, dbh, adjustment)?,
            top: top_biomass(species, dbh, height, adjustment)?,
        })
    }

    pub fn bole(&self) -> f64 {
        self.stem + self.bark
    }

    /// Sum of the above-ground parts; equals `total` by construction.
    pub fn above_ground_sum(&self) -> f64 {
        self.stem + self.bark + self.foliage + self.stump + self.top
    }
}
