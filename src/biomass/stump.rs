//! Stump volume and biomass from the Raile (1982) stump taper model.
//!
//! Relative stump diameter at height `h` (feet):
//! `d(h) / dbh = a + b * (4.5 - h) / (h + 1)`.
//! Volume is the integral of the cross-sectional area between `h = 0` and
//! `h = 1`, i.e. `pi * dbh^2 / 576 * integral(d(h)^2)` in cubic feet.

use serde::{Deserialize, Serialize};

use super::jenkins::dbh_cm;
use crate::error::EstimatorError;
use crate::models::SpeciesRecord;

/// Weight of one cubic foot of water in pounds.
pub const WATER_LBS_PER_CUFT: f64 = 62.4;

/// `pi / 576` converts `dbh^2` (in²) into a basal area in ft² (`pi d^2 / (4 * 144)`).
pub const SQ_INCH_FACTOR: f64 = std::f64::consts::PI / 576.0;

/// Lower and upper relative stump heights for the volume integral.
pub const STUMP_BOUNDS: (f64, f64) = (0.0, 1.0);

/// Component-ratio adjustment applied to stump biomass.
///
/// The published adjustment has not been pinned down; `Pending` refuses to
/// produce a number so callers can tell "not yet available" from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StumpAdjustment {
    #[default]
    Pending,
    Fixed(f64),
}

impl StumpAdjustment {
    pub fn factor(self) -> Result<f64, EstimatorError> {
        match self {
            StumpAdjustment::Pending => Err(EstimatorError::NotImplemented(
                "stump biomass component-ratio adjustment factor".to_string(),
            )),
            StumpAdjustment::Fixed(f) if f.is_finite() && f >= 0.0 => Ok(f),
            StumpAdjustment::Fixed(f) => Err(EstimatorError::ValidationError(format!(
                "stump adjustment factor must be a non-negative number, got {f}"
            ))),
        }
    }
}

impl From<Option<f64>> for StumpAdjustment {
    fn from(value: Option<f64>) -> Self {
        value.map_or(StumpAdjustment::Pending, StumpAdjustment::Fixed)
    }
}

/// Stump diameter as a fraction of DBH at height `h` feet.
pub fn relative_stump_diameter(a: f64, b: f64, h: f64) -> f64 {
    a + b * (4.5 - h) / (h + 1.0)
}

fn check_stump_height(h: f64) -> Result<(), EstimatorError> {
    if !h.is_finite() || h < 0.0 {
        return Err(EstimatorError::ValidationError(format!(
            "Stump height must be a non-negative number, got {h}"
        )));
    }
    Ok(())
}

/// Inside-bark stump diameter in inches at height `h` feet.
pub fn stump_diameter_inside_bark(
    species: &SpeciesRecord,
    dbh: f64,
    h: f64,
) -> Result<f64, EstimatorError> {
    dbh_cm(dbh)?;
    check_stump_height(h)?;
    let a = species.require("raile_stump_dib_b1", species.raile_stump_dib_b1)?;
    let b = species.require("raile_stump_dib_b2", species.raile_stump_dib_b2)?;
    Ok(dbh * relative_stump_diameter(a, b, h))
}

/// Outside-bark stump diameter in inches at height `h` feet.
pub fn stump_diameter_outside_bark(
    species: &SpeciesRecord,
    dbh: f64,
    h: f64,
) -> Result<f64, EstimatorError> {
    dbh_cm(dbh)?;
    check_stump_height(h)?;
    let b = species.require("raile_stump_dob_b1", species.raile_stump_dob_b1)?;
    Ok(dbh * relative_stump_diameter(1.0, b, h))
}

/// Antiderivative of `(a + b (4.5 - h) / (h + 1))^2` with respect to `h`.
///
/// Writing the taper as `c + k / (h + 1)` with `c = a - b` and `k = 5.5 b`
/// gives `c^2 h + 2 c k ln(h + 1) - k^2 / (h + 1)`.
pub fn taper_antiderivative(a: f64, b: f64, h: f64) -> f64 {
    let c = a - b;
    let k = 5.5 * b;
    c * c * h + 2.0 * c * k * (h + 1.0).ln() - k * k / (h + 1.0)
}

/// Definite integral of the squared relative taper between two heights.
pub fn taper_integral(a: f64, b: f64, lower: f64, upper: f64) -> f64 {
    taper_antiderivative(a, b, upper) - taper_antiderivative(a, b, lower)
}

fn stump_volume(dbh: f64, a: f64, b: f64) -> Result<f64, EstimatorError> {
    dbh_cm(dbh)?;
    let (lower, upper) = STUMP_BOUNDS;
    Ok(SQ_INCH_FACTOR * dbh * dbh * taper_integral(a, b, lower, upper))
}

/// Inside-bark stump volume in cubic feet.
pub fn stump_volume_inside_bark(species: &SpeciesRecord, dbh: f64) -> Result<f64, EstimatorError> {
    dbh_cm(dbh)?;
    let a = species.require("raile_stump_dib_b1", species.raile_stump_dib_b1)?;
    let b = species.require("raile_stump_dib_b2", species.raile_stump_dib_b2)?;
    stump_volume(dbh, a, b)
}

/// Outside-bark stump volume in cubic feet.
pub fn stump_volume_outside_bark(species: &SpeciesRecord, dbh: f64) -> Result<f64, EstimatorError> {
    dbh_cm(dbh)?;
    let b = species.require("raile_stump_dob_b1", species.raile_stump_dob_b1)?;
    stump_volume(dbh, 1.0, b)
}

/// Stump biomass in pounds: wood plus bark shell, converted with specific
/// gravity and scaled by the component-ratio adjustment.
pub fn stump_biomass(
    species: &SpeciesRecord,
    dbh: f64,
    adjustment: StumpAdjustment,
) -> Result<f64, EstimatorError> {
    let inside = stump_volume_inside_bark(species, dbh)?;
    let outside = stump_volume_outside_bark(species, dbh)?;
    let wood_sg = species.require("wood_spgr_greenvol_drywt", species.wood_spgr_greenvol_drywt)?;
    let bark_sg = species.require("bark_spgr_greenvol_drywt", species.bark_spgr_greenvol_drywt)?;
    let factor = adjustment.factor()?;

    let bark_volume = outside - inside;
    Ok((inside * wood_sg + bark_volume * bark_sg) * WATER_LBS_PER_CUFT * factor)
}
