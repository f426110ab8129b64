//! Jenkins et al. (2003) national-scale allometric biomass equations.
//!
//! Total above-ground biomass: `exp(b1 + b2 * ln(dbh_cm))` kg, reported in lb.
//! Component ratios: `exp(b1 + b2 / dbh_cm)`.

use crate::error::EstimatorError;
use crate::models::{BiomassComponent, SpeciesRecord};

pub const CM_PER_INCH: f64 = 2.54;
pub const LBS_PER_KG: f64 = 2.2046;

/// Convert a DBH in inches to centimeters, rejecting non-positive values.
pub(crate) fn dbh_cm(dbh: f64) -> Result<f64, EstimatorError> {
    if !dbh.is_finite() || dbh <= 0.0 {
        return Err(EstimatorError::ValidationError(format!(
            "DBH must be a positive number, got {dbh}"
        )));
    }
    Ok(dbh * CM_PER_INCH)
}

/// Total above-ground biomass in pounds.
///
/// # Examples
///
/// ```
/// use tree_estimator::biomass::total_above_ground_biomass;
/// use tree_estimator::models::SpeciesRecord;
///
/// let aspen = SpeciesRecord {
///     species_cd: 746,
///     jenkins_total_b1: Some(-2.2094),
///     jenkins_total_b2: Some(2.3867),
///     ..Default::default()
/// };
/// let lbs = total_above_ground_biomass(&aspen, 7.0).unwrap();
/// assert!(lbs > 0.0);
/// ```
pub fn total_above_ground_biomass(species: &SpeciesRecord, dbh: f64) -> Result<f64, EstimatorError> {
    let d = dbh_cm(dbh)?;
    let b1 = species.require("jenkins_total_b1", species.jenkins_total_b1)?;
    let b2 = species.require("jenkins_total_b2", species.jenkins_total_b2)?;
    Ok((b1 + b2 * d.ln()).exp() * LBS_PER_KG)
}

/// Jenkins component ratio `exp(b1 + b2 / dbh_cm)` for an arbitrary coefficient pair.
pub fn component_ratio(b1: f64, b2: f64, dbh: f64) -> Result<f64, EstimatorError> {
    let d = dbh_cm(dbh)?;
    Ok((b1 + b2 / d).exp())
}

/// Ratio of a component to total above-ground biomass for this species.
pub fn species_ratio(
    species: &SpeciesRecord,
    dbh: f64,
    component: BiomassComponent,
) -> Result<f64, EstimatorError> {
    dbh_cm(dbh)?;
    let (b1, b2) = species.ratio_coefficients(component)?;
    component_ratio(b1, b2, dbh)
}

/// Biomass of one component in pounds: total above-ground times its ratio.
pub fn component_biomass(
    species: &SpeciesRecord,
    dbh: f64,
    component: BiomassComponent,
) -> Result<f64, EstimatorError> {
    let total = total_above_ground_biomass(species, dbh)?;
    Ok(total * species_ratio(species, dbh, component)?)
}

/// Bole biomass: stem wood plus stem bark, in pounds.
pub fn bole_biomass(species: &SpeciesRecord, dbh: f64) -> Result<f64, EstimatorError> {
    Ok(component_biomass(species, dbh, BiomassComponent::Stem)?
        + component_biomass(species, dbh, BiomassComponent::Bark)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn aspen() -> SpeciesRecord {
        SpeciesRecord {
            species_cd: 746,
            jenkins_total_b1: Some(-2.2094),
            jenkins_total_b2: Some(2.3867),
            jenkins_stem_wood_ratio_b1: Some(-0.3065),
            jenkins_stem_wood_ratio_b2: Some(-5.4240),
            jenkins_stem_bark_ratio_b1: Some(-2.0129),
            jenkins_stem_bark_ratio_b2: Some(-1.6805),
            jenkins_foliage_ratio_b1: Some(-4.0813),
            jenkins_foliage_ratio_b2: Some(5.8816),
            jenkins_root_ratio_b1: Some(-1.6911),
            jenkins_root_ratio_b2: Some(0.8160),
            ..Default::default()
        }
    }

    #[test]
    fn test_dbh_cm_conversion() {
        assert_approx_eq!(dbh_cm(10.0).unwrap(), 25.4, 1e-12);
    }

    #[test]
    fn test_dbh_cm_rejects_zero_and_negative() {
        assert!(dbh_cm(0.0).is_err());
        assert!(dbh_cm(-2.0).is_err());
        assert!(dbh_cm(f64::INFINITY).is_err());
    }

    #[test]
    fn test_total_ag_aspen_7_inch() {
        // exp(-2.2094 + 2.3867 * ln(17.78)) * 2.2046
        let lbs = total_above_ground_biomass(&aspen(), 7.0).unwrap();
        assert_approx_eq!(lbs, 232.8154, 1e-3);
    }

    #[test]
    fn test_total_ag_missing_coefficient() {
        let mut sp = aspen();
        sp.jenkins_total_b2 = None;
        let err = total_above_ground_biomass(&sp, 7.0).unwrap_err();
        assert!(err.to_string().contains("jenkins_total_b2"));
    }

    #[test]
    fn test_component_ratio_shape() {
        // b2 = 0 makes the ratio independent of diameter
        let r1 = component_ratio(-1.0, 0.0, 4.0).unwrap();
        let r2 = component_ratio(-1.0, 0.0, 40.0).unwrap();
        assert_approx_eq!(r1, (-1.0f64).exp(), 1e-12);
        assert_approx_eq!(r1, r2, 1e-12);
    }

    #[test]
    fn test_stem_ratio_increases_with_dbh() {
        let small = species_ratio(&aspen(), 3.0, BiomassComponent::Stem).unwrap();
        let large = species_ratio(&aspen(), 20.0, BiomassComponent::Stem).unwrap();
        assert!(large > small);
        assert!(large < 1.0);
    }

    #[test]
    fn test_component_biomass_is_total_times_ratio() {
        let sp = aspen();
        let total = total_above_ground_biomass(&sp, 12.0).unwrap();
        for component in BiomassComponent::ALL {
            let ratio = species_ratio(&sp, 12.0, component).unwrap();
            let mass = component_biomass(&sp, 12.0, component).unwrap();
            assert_approx_eq!(mass, total * ratio, 1e-9);
        }
    }

    #[test]
    fn test_bole_is_stem_plus_bark() {
        let sp = aspen();
        let stem = component_biomass(&sp, 9.0, BiomassComponent::Stem).unwrap();
        let bark = component_biomass(&sp, 9.0, BiomassComponent::Bark).unwrap();
        assert_approx_eq!(bole_biomass(&sp, 9.0).unwrap(), stem + bark, 1e-9);
    }

    #[test]
    fn test_component_biomass_invalid_dbh() {
        let err = component_biomass(&aspen(), -1.0, BiomassComponent::Foliage).unwrap_err();
        assert!(matches!(err, EstimatorError::ValidationError(_)));
    }
}
