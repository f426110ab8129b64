//! Gross cubic-foot volume dispatch.
//!
//! Dispatch is two-tier: the region identifier picks a [`RegionTable`], then
//! that table's ordered [`EquationRule`] list picks the equation row for the
//! effective species code and measurement.

mod forms;
mod region;
mod rules;

use serde::Serialize;
use tracing::debug;

use crate::error::EstimatorError;
use crate::models::{Measurement, VolumeCoefficients};

pub use forms::{apply_floor, volume_proxy, EquationForm, CAPPED_FLOOR, SMALL_FLOOR, VOLUME_PROXY_SCALE};
pub use region::{
    normalize_region, RegionTable, ALASKA_REGIONS, CENTRAL_REGIONS, NORTHEAST_REGIONS,
    PACIFIC_NORTHWEST_REGIONS, ROCKY_MOUNTAIN_REGIONS, SOUTH_REGIONS,
};
pub use rules::{
    first_match, rules_for, DiameterMatch, EquationRule, InputMatch, RegionMatch, SpeciesMatch,
    FIRST_HARDWOOD_CODE,
};

/// Select the equation row for a region, effective species, and measurement.
///
/// Depends only on its arguments; the tables are static.
pub fn select_rule(
    region_id: &str,
    eff_species_cd: i64,
    m: &Measurement,
) -> Result<&'static EquationRule, EstimatorError> {
    let region = normalize_region(region_id);
    let table = RegionTable::classify(&region)?;
    let rule = first_match(rules_for(table), &region, eff_species_cd, m).ok_or_else(|| {
        EstimatorError::UnknownEquation {
            region: region.clone(),
            species: eff_species_cd,
        }
    })?;
    debug!(
        region = %region,
        table = %table,
        species = eff_species_cd,
        rule = rule.label,
        form = %rule.form,
        "selected volume equation"
    );
    Ok(rule)
}

/// Outcome of a volume evaluation together with the row that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeEstimate {
    pub region: String,
    pub eff_species_cd: i64,
    pub table: RegionTable,
    pub rule: &'static str,
    pub form: String,
    pub gross_volume_cuft: f64,
}

/// Gross cubic-foot volume for one tree.
///
/// # Examples
///
/// ```
/// use tree_estimator::models::{Measurement, VolumeCoefficients};
/// use tree_estimator::volume::gross_volume;
///
/// let row = VolumeCoefficients::from_values("S33", 68, &[0.5, 0.0022]);
/// let m = Measurement::new().with_dbh(10.0).with_height(60.0);
/// let cuft = gross_volume("S33", 68, &row, &m).unwrap();
/// assert!((cuft - (0.5 + 0.0022 * 100.0 * 60.0)).abs() < 1e-9);
/// ```
pub fn gross_volume(
    region_id: &str,
    eff_species_cd: i64,
    coefs: &VolumeCoefficients,
    m: &Measurement,
) -> Result<f64, EstimatorError> {
    Ok(estimate_volume(region_id, eff_species_cd, coefs, m)?.gross_volume_cuft)
}

/// Like [`gross_volume`], but also reports which row was applied.
pub fn estimate_volume(
    region_id: &str,
    eff_species_cd: i64,
    coefs: &VolumeCoefficients,
    m: &Measurement,
) -> Result<VolumeEstimate, EstimatorError> {
    let rule = select_rule(region_id, eff_species_cd, m)?;
    let value = rule.form.evaluate(coefs, m)?;
    let region = normalize_region(region_id);
    Ok(VolumeEstimate {
        table: RegionTable::classify(&region)?,
        region,
        eff_species_cd,
        rule: rule.label,
        form: rule.form.to_string(),
        gross_volume_cuft: value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_select_rule_unknown_region() {
        let err = select_rule("S99", 131, &Measurement::new()).unwrap_err();
        assert!(matches!(err, EstimatorError::UnknownRegion(_)));
    }

    #[test]
    fn test_select_rule_alaska_unsupported() {
        let err = select_rule("S27LAK", 94, &Measurement::new().with_dbh(10.0)).unwrap_err();
        assert!(matches!(err, EstimatorError::UnsupportedRegion(_)));
    }

    #[test]
    fn test_select_rule_no_row_is_unknown_equation() {
        // Rocky Mountain woodland rows need a species match; a non-positive
        // code falls through every softwood/hardwood predicate.
        let err = select_rule("S22LMT", 0, &Measurement::new()).unwrap_err();
        match err {
            EstimatorError::UnknownEquation { region, species } => {
                assert_eq!(region, "S22LMT");
                assert_eq!(species, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_south_table_2_row_4_high_diameter_branch() {
        let row = VolumeCoefficients::from_values("S33", 122, &[1.0, 0.0021, 4.0, 0.0019]);
        let m = Measurement::new().with_dbh(25.0).with_height(90.0);
        let est = estimate_volume("S33", 122, &row, &m).unwrap();
        assert_eq!(est.rule, "Table 2 Row 4");
        assert_eq!(est.table, RegionTable::South);
        assert_approx_eq!(est.gross_volume_cuft, 4.0 + 0.0019 * 625.0 * 90.0, 1e-9);
    }

    #[test]
    fn test_northeast_missing_bole_height() {
        let row = VolumeCoefficients::from_values("S24", 316, &[-1.0, 0.1, 2.0, 0.003, 2.0, 1.0]);
        let m = Measurement::new().with_dbh(12.0).with_height(70.0);
        let err = gross_volume("S24", 316, &row, &m).unwrap_err();
        assert!(matches!(err, EstimatorError::ValidationError(_)));
        assert!(err.to_string().contains("bole height"));
    }

    #[test]
    fn test_region_is_normalized() {
        let row = VolumeCoefficients::from_values("S33", 68, &[0.5, 0.0022]);
        let m = Measurement::new().with_dbh(10.0).with_height(60.0);
        let est = estimate_volume(" s33 ", 68, &row, &m).unwrap();
        assert_eq!(est.region, "S33");
    }

    #[test]
    fn test_pending_row_is_not_implemented() {
        let row = VolumeCoefficients::new("S26LCA", 818);
        let m = Measurement::new().with_dbh(14.0).with_height(60.0);
        let err = gross_volume("S26LCA", 818, &row, &m).unwrap_err();
        assert!(matches!(err, EstimatorError::NotImplemented(_)));
    }

    #[test]
    fn test_floor_reported_for_negative_raw() {
        let row = VolumeCoefficients::from_values("S33", 68, &[-100.0, 0.0001]);
        let m = Measurement::new().with_dbh(2.0).with_height(10.0);
        assert_eq!(gross_volume("S33", 68, &row, &m).unwrap(), SMALL_FLOOR);
    }
}
