//! Closed-form gross volume equations.
//!
//! Each form reads a fixed subset of the `b0..b19` row and a fixed set of
//! measurements. A raw result that is non-positive or undefined is replaced
//! by the form's floor constant.

use crate::error::EstimatorError;
use crate::models::{Coef, Input, Measurement, VolumeCoefficients};

/// Scale applied to `drc^2 * height` for the woodland volume proxy.
pub const VOLUME_PROXY_SCALE: f64 = 0.001;

/// Floor for most forms, in cubic feet.
pub const SMALL_FLOOR: f64 = 0.1;
/// Floor for the diameter-capped forms, in cubic feet.
pub const CAPPED_FLOOR: f64 = 1.0;

/// Woodland volume proxy `v1 = drc^2 * height * 0.001`.
pub fn volume_proxy(drc: f64, height: f64) -> f64 {
    drc * drc * height * VOLUME_PROXY_SCALE
}

/// Replace a non-positive or undefined raw volume with `floor`.
pub fn apply_floor(raw: f64, floor: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        floor
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EquationForm {
    /// `b0 + b1 D^b2 + b3 D^b4 BH^b5` (Scott 1981, bole height)
    ScottBoleHeight,
    /// `b0 + b1 D^2 H`
    CombinedVariable,
    /// `b0 D^b1 H^b2`
    PowerModel,
    /// `10^(b0 + b1 log D + b2 log H) + b3`
    LogLinear,
    /// `b0 + b1 D^2 H` below `cutoff`, `b2 + b3 D^2 H` from `cutoff` up
    SegmentedDbh { cutoff: f64 },
    /// Hahn (1984) merchantable height from site index and basal area,
    /// then `b7 + b8 D^2 mht`
    HahnSiteIndex,
    /// `b1 v1^b2` while `v1 < b0`, else `b3 + b4 v1`
    DrcPiecewise,
    /// `(b0 + b1 cbrt(v1) + b2 S)^3`, `S = 1` for single-stem trees
    MultiStemCubeRoot,
    /// `b0 + b1 d^b2 H` with `d = min(D, b3)`
    CappedDiameter,
    /// `10^(b0 + b1 log d + b2 log H)` with `d = min(D, b3)`
    CappedLogLinear,
    /// `D^2 / (b0 + b1 / H)` (Honer 1967)
    Honer,
    /// Row recognized but its equation is not available yet
    Pending(&'static str),
}

impl EquationForm {
    pub fn name(&self) -> &'static str {
        match self {
            EquationForm::ScottBoleHeight => "scott-bole-height",
            EquationForm::CombinedVariable => "combined-variable",
            EquationForm::PowerModel => "power",
            EquationForm::LogLinear => "log-linear",
            EquationForm::SegmentedDbh { .. } => "segmented-dbh",
            EquationForm::HahnSiteIndex => "hahn-site-index",
            EquationForm::DrcPiecewise => "drc-piecewise",
            EquationForm::MultiStemCubeRoot => "multi-stem-cube-root",
            EquationForm::CappedDiameter => "capped-diameter",
            EquationForm::CappedLogLinear => "capped-log-linear",
            EquationForm::Honer => "honer",
            EquationForm::Pending(_) => "pending",
        }
    }

    /// Measurements that must be present and positive.
    pub fn required_inputs(&self) -> &'static [Input] {
        match self {
            EquationForm::ScottBoleHeight => &[Input::Dbh, Input::BoleHeight],
            EquationForm::CombinedVariable
            | EquationForm::PowerModel
            | EquationForm::LogLinear
            | EquationForm::SegmentedDbh { .. }
            | EquationForm::CappedDiameter
            | EquationForm::CappedLogLinear
            | EquationForm::Honer => &[Input::Dbh, Input::Height],
            EquationForm::HahnSiteIndex => &[Input::Dbh, Input::SiteIndex, Input::BasalArea],
            EquationForm::DrcPiecewise => &[Input::Drc, Input::Height],
            EquationForm::MultiStemCubeRoot => &[Input::Drc, Input::Height, Input::Stems],
            EquationForm::Pending(_) => &[],
        }
    }

    /// Coefficient columns this form reads.
    pub fn coefficients(&self) -> &'static [Coef] {
        use Coef::*;
        match self {
            EquationForm::ScottBoleHeight => &[B0, B1, B2, B3, B4, B5],
            EquationForm::CombinedVariable => &[B0, B1],
            EquationForm::PowerModel => &[B0, B1, B2],
            EquationForm::LogLinear => &[B0, B1, B2, B3],
            EquationForm::SegmentedDbh { .. } => &[B0, B1, B2, B3],
            EquationForm::HahnSiteIndex => &[B0, B1, B2, B3, B4, B5, B6, B7, B8],
            EquationForm::DrcPiecewise => &[B0, B1, B2, B3, B4],
            EquationForm::MultiStemCubeRoot => &[B0, B1, B2],
            EquationForm::CappedDiameter => &[B0, B1, B2, B3],
            EquationForm::CappedLogLinear => &[B0, B1, B2, B3],
            EquationForm::Honer => &[B0, B1],
            EquationForm::Pending(_) => &[],
        }
    }

    /// Floor constant substituted for non-positive results.
    pub fn floor(&self) -> f64 {
        match self {
            EquationForm::CappedDiameter | EquationForm::CappedLogLinear => CAPPED_FLOOR,
            _ => SMALL_FLOOR,
        }
    }

    /// Evaluate the form, validating inputs and applying the floor policy.
    pub fn evaluate(
        &self,
        coefs: &VolumeCoefficients,
        m: &Measurement,
    ) -> Result<f64, EstimatorError> {
        if let EquationForm::Pending(what) = self {
            return Err(EstimatorError::NotImplemented(format!(
                "{what} (region '{}', species {})",
                coefs.region, coefs.eff_species_cd
            )));
        }
        m.require_all(self.required_inputs())?;
        let raw = self.raw(coefs, m)?;
        Ok(apply_floor(raw, self.floor()))
    }

    /// The unfloored algebraic result. Inputs must already be validated.
    pub fn raw(&self, coefs: &VolumeCoefficients, m: &Measurement) -> Result<f64, EstimatorError> {
        use Coef::*;
        let value = match self {
            EquationForm::ScottBoleHeight => {
                let [b0, b1, b2, b3, b4, b5] = coefs.get_many([B0, B1, B2, B3, B4, B5])?;
                let d = m.require(Input::Dbh)?;
                let bole = m.require(Input::BoleHeight)?;
                b0 + b1 * d.powf(b2) + b3 * d.powf(b4) * bole.powf(b5)
            }
            EquationForm::CombinedVariable => {
                let [b0, b1] = coefs.get_many([B0, B1])?;
                let d = m.require(Input::Dbh)?;
                let h = m.require(Input::Height)?;
                b0 + b1 * d * d * h
            }
            EquationForm::PowerModel => {
                let [b0, b1, b2] = coefs.get_many([B0, B1, B2])?;
                let d = m.require(Input::Dbh)?;
                let h = m.require(Input::Height)?;
                b0 * d.powf(b1) * h.powf(b2)
            }
            EquationForm::LogLinear => {
                let [b0, b1, b2, b3] = coefs.get_many([B0, B1, B2, B3])?;
                let d = m.require(Input::Dbh)?;
                let h = m.require(Input::Height)?;
                10f64.powf(b0 + b1 * d.log10() + b2 * h.log10()) + b3
            }
            EquationForm::SegmentedDbh { cutoff } => {
                let [b0, b1, b2, b3] = coefs.get_many([B0, B1, B2, B3])?;
                let d = m.require(Input::Dbh)?;
                let h = m.require(Input::Height)?;
                if d < *cutoff {
                    b0 + b1 * d * d * h
                } else {
                    b2 + b3 * d * d * h
                }
            }
            EquationForm::HahnSiteIndex => {
                let [b0, b1, b2, b3, b4, b5, b6, b7, b8] =
                    coefs.get_many([B0, B1, B2, B3, B4, B5, B6, B7, B8])?;
                let d = m.require(Input::Dbh)?;
                let si = m.require(Input::SiteIndex)?;
                let ba = m.require(Input::BasalArea)?;
                let merch_height = b0
                    * (1.0 - (-b1 * d).exp()).powf(b2)
                    * si.powf(b3)
                    * (1.00001 - b4 / d).max(0.0).powf(b5)
                    * ba.powf(b6);
                b7 + b8 * d * d * merch_height
            }
            EquationForm::DrcPiecewise => {
                let [b0, b1, b2, b3, b4] = coefs.get_many([B0, B1, B2, B3, B4])?;
                let v1 = volume_proxy(m.require(Input::Drc)?, m.require(Input::Height)?);
                if v1 < b0 {
                    b1 * v1.powf(b2)
                } else {
                    b3 + b4 * v1
                }
            }
            EquationForm::MultiStemCubeRoot => {
                let [b0, b1, b2] = coefs.get_many([B0, B1, B2])?;
                let v1 = volume_proxy(m.require(Input::Drc)?, m.require(Input::Height)?);
                let single = if m.stems == Some(1) { 1.0 } else { 0.0 };
                (b0 + b1 * v1.cbrt() + b2 * single).powi(3)
            }
            EquationForm::CappedDiameter => {
                let [b0, b1, b2, b3] = coefs.get_many([B0, B1, B2, B3])?;
                let d = m.require(Input::Dbh)?.min(b3);
                let h = m.require(Input::Height)?;
                b0 + b1 * d.powf(b2) * h
            }
            EquationForm::CappedLogLinear => {
                let [b0, b1, b2, b3] = coefs.get_many([B0, B1, B2, B3])?;
                let d = m.require(Input::Dbh)?.min(b3);
                let h = m.require(Input::Height)?;
                10f64.powf(b0 + b1 * d.log10() + b2 * h.log10())
            }
            EquationForm::Honer => {
                let [b0, b1] = coefs.get_many([B0, B1])?;
                let d = m.require(Input::Dbh)?;
                let h = m.require(Input::Height)?;
                d * d / (b0 + b1 / h)
            }
            EquationForm::Pending(what) => {
                return Err(EstimatorError::NotImplemented((*what).to_string()));
            }
        };
        Ok(value)
    }
}

impl std::fmt::Display for EquationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EquationForm::SegmentedDbh { cutoff } => write!(f, "{} (cutoff {cutoff} in)", self.name()),
            _ => write!(f, "{}", self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const ALL_FORMS: [EquationForm; 11] = [
        EquationForm::ScottBoleHeight,
        EquationForm::CombinedVariable,
        EquationForm::PowerModel,
        EquationForm::LogLinear,
        EquationForm::SegmentedDbh { cutoff: 21.0 },
        EquationForm::HahnSiteIndex,
        EquationForm::DrcPiecewise,
        EquationForm::MultiStemCubeRoot,
        EquationForm::CappedDiameter,
        EquationForm::CappedLogLinear,
        EquationForm::Honer,
    ];

    fn full_measurement() -> Measurement {
        Measurement::new()
            .with_dbh(12.0)
            .with_height(70.0)
            .with_basal_area(110.0)
            .with_site_index(60.0)
            .with_stems(1)
            .with_drc(10.0)
            .with_bole_height(40.0)
    }

    fn row(values: &[f64]) -> VolumeCoefficients {
        VolumeCoefficients::from_values("TEST", 1, values)
    }

    #[test]
    fn test_apply_floor() {
        assert_eq!(apply_floor(5.0, 0.1), 5.0);
        assert_eq!(apply_floor(0.0, 0.1), 0.1);
        assert_eq!(apply_floor(-3.0, 1.0), 1.0);
        assert_eq!(apply_floor(f64::NAN, 0.1), 0.1);
        assert_eq!(apply_floor(f64::NEG_INFINITY, 1.0), 1.0);
    }

    #[test]
    fn test_volume_proxy() {
        assert_approx_eq!(volume_proxy(10.0, 20.0), 2.0, 1e-12);
    }

    #[test]
    fn test_scott_bole_height() {
        let c = row(&[-2.0, 0.05, 2.0, 0.004, 2.0, 1.0]);
        let m = full_measurement();
        let expected = -2.0 + 0.05 * 144.0 + 0.004 * 144.0 * 40.0;
        assert_approx_eq!(EquationForm::ScottBoleHeight.evaluate(&c, &m).unwrap(), expected, 1e-9);
    }

    #[test]
    fn test_scott_requires_bole_height() {
        let c = row(&[-2.0, 0.05, 2.0, 0.004, 2.0, 1.0]);
        let m = Measurement::new().with_dbh(12.0).with_height(70.0);
        let err = EquationForm::ScottBoleHeight.evaluate(&c, &m).unwrap_err();
        assert!(matches!(err, EstimatorError::ValidationError(_)));
        assert!(err.to_string().contains("bole height is required"));
    }

    #[test]
    fn test_combined_variable() {
        let c = row(&[1.0, 0.002]);
        let v = EquationForm::CombinedVariable.evaluate(&c, &full_measurement()).unwrap();
        assert_approx_eq!(v, 1.0 + 0.002 * 144.0 * 70.0, 1e-9);
    }

    #[test]
    fn test_power_model() {
        let c = row(&[0.0025, 1.9, 1.0]);
        let v = EquationForm::PowerModel.evaluate(&c, &full_measurement()).unwrap();
        assert_approx_eq!(v, 0.0025 * 12f64.powf(1.9) * 70.0, 1e-9);
    }

    #[test]
    fn test_log_linear() {
        let c = row(&[-2.6, 1.9, 1.1, -0.5]);
        let v = EquationForm::LogLinear.evaluate(&c, &full_measurement()).unwrap();
        let expected = 10f64.powf(-2.6 + 1.9 * 12f64.log10() + 1.1 * 70f64.log10()) - 0.5;
        assert_approx_eq!(v, expected, 1e-9);
    }

    #[test]
    fn test_segmented_boundary_uses_second_block() {
        let c = row(&[1.0, 0.002, 5.0, 0.0019]);
        let form = EquationForm::SegmentedDbh { cutoff: 21.0 };
        let below = Measurement::new().with_dbh(20.999).with_height(80.0);
        let at = Measurement::new().with_dbh(21.0).with_height(80.0);
        assert_approx_eq!(
            form.evaluate(&c, &below).unwrap(),
            1.0 + 0.002 * 20.999 * 20.999 * 80.0,
            1e-9
        );
        assert_approx_eq!(form.evaluate(&c, &at).unwrap(), 5.0 + 0.0019 * 441.0 * 80.0, 1e-9);
    }

    #[test]
    fn test_hahn_site_index() {
        let c = row(&[5.0, 0.2, 1.0, 0.5, 4.0, 0.5, 0.1, -1.0, 0.002]);
        let m = full_measurement();
        let mht = 5.0
            * (1.0 - (-0.2f64 * 12.0).exp())
            * 60f64.sqrt()
            * (1.00001f64 - 4.0 / 12.0).sqrt()
            * 110f64.powf(0.1);
        let expected = -1.0 + 0.002 * 144.0 * mht;
        assert_approx_eq!(EquationForm::HahnSiteIndex.evaluate(&c, &m).unwrap(), expected, 1e-9);
    }

    #[test]
    fn test_hahn_small_tree_hits_floor() {
        let c = row(&[5.0, 0.2, 1.0, 0.5, 4.0, 0.5, 0.1, -1.0, 0.002]);
        let m = Measurement::new().with_dbh(3.0).with_site_index(60.0).with_basal_area(90.0);
        assert_eq!(EquationForm::HahnSiteIndex.evaluate(&c, &m).unwrap(), SMALL_FLOOR);
    }

    #[test]
    fn test_hahn_requires_site_index() {
        let c = row(&[5.0, 0.2, 1.0, 0.5, 4.0, 0.5, 0.1, -1.0, 0.002]);
        let m = Measurement::new().with_dbh(12.0).with_basal_area(90.0);
        let err = EquationForm::HahnSiteIndex.evaluate(&c, &m).unwrap_err();
        assert!(err.to_string().contains("site index is required"));
    }

    #[test]
    fn test_drc_piecewise_threshold() {
        // v1 = 10^2 * 20 * 0.001 = 2.0
        let c = row(&[2.0, 1.5, 0.9, 0.4, 1.8]);
        let m = Measurement::new().with_drc(10.0).with_height(20.0);
        assert_approx_eq!(EquationForm::DrcPiecewise.evaluate(&c, &m).unwrap(), 0.4 + 1.8 * 2.0, 1e-9);
        let m = Measurement::new().with_drc(10.0).with_height(19.0);
        assert_approx_eq!(
            EquationForm::DrcPiecewise.evaluate(&c, &m).unwrap(),
            1.5 * 1.9f64.powf(0.9),
            1e-9
        );
    }

    #[test]
    fn test_multi_stem_single_versus_clump() {
        let c = row(&[-0.1, 1.0, 0.2]);
        let single = Measurement::new().with_drc(10.0).with_height(27.0).with_stems(1);
        let clump = Measurement::new().with_drc(10.0).with_height(27.0).with_stems(3);
        // v1 = 2.7, cbrt = 1.392...
        let base = -0.1 + 2.7f64.cbrt();
        assert_approx_eq!(
            EquationForm::MultiStemCubeRoot.evaluate(&c, &single).unwrap(),
            (base + 0.2).powi(3),
            1e-9
        );
        assert_approx_eq!(
            EquationForm::MultiStemCubeRoot.evaluate(&c, &clump).unwrap(),
            base.powi(3),
            1e-9
        );
    }

    #[test]
    fn test_multi_stem_negative_base_floors() {
        let c = row(&[-5.0, 1.0, 0.0]);
        let m = Measurement::new().with_drc(3.0).with_height(10.0).with_stems(2);
        assert_eq!(EquationForm::MultiStemCubeRoot.evaluate(&c, &m).unwrap(), SMALL_FLOOR);
    }

    #[test]
    fn test_multi_stem_requires_stems() {
        let c = row(&[-0.1, 1.0, 0.2]);
        let m = Measurement::new().with_drc(10.0).with_height(27.0);
        let err = EquationForm::MultiStemCubeRoot.evaluate(&c, &m).unwrap_err();
        assert!(err.to_string().contains("stem count is required"));
    }

    #[test]
    fn test_capped_diameter_caps() {
        let c = row(&[0.5, 0.002, 2.0, 30.0]);
        let big = Measurement::new().with_dbh(45.0).with_height(100.0);
        let at_cap = Measurement::new().with_dbh(30.0).with_height(100.0);
        let a = EquationForm::CappedDiameter.evaluate(&c, &big).unwrap();
        let b = EquationForm::CappedDiameter.evaluate(&c, &at_cap).unwrap();
        assert_approx_eq!(a, b, 1e-12);
        assert_approx_eq!(a, 0.5 + 0.002 * 900.0 * 100.0, 1e-9);
    }

    #[test]
    fn test_capped_forms_use_large_floor() {
        let c = row(&[-50.0, 0.0001, 2.0, 30.0]);
        let m = Measurement::new().with_dbh(5.0).with_height(20.0);
        assert_eq!(EquationForm::CappedDiameter.evaluate(&c, &m).unwrap(), CAPPED_FLOOR);

        // Overflows to infinity, which is not a usable volume.
        let c = row(&[400.0, 1.0, 1.0, 30.0]);
        assert_eq!(EquationForm::CappedLogLinear.evaluate(&c, &m).unwrap(), CAPPED_FLOOR);
    }

    #[test]
    fn test_capped_log_linear() {
        let c = row(&[-2.6, 1.9, 1.1, 30.0]);
        let v = EquationForm::CappedLogLinear.evaluate(&c, &full_measurement()).unwrap();
        let expected = 10f64.powf(-2.6 + 1.9 * 12f64.log10() + 1.1 * 70f64.log10());
        assert_approx_eq!(v, expected, 1e-9);
        assert!(v > 30.0 && v < 30.5);

        let big = Measurement::new().with_dbh(48.0).with_height(70.0);
        let capped = Measurement::new().with_dbh(30.0).with_height(70.0);
        assert_approx_eq!(
            EquationForm::CappedLogLinear.evaluate(&c, &big).unwrap(),
            EquationForm::CappedLogLinear.evaluate(&c, &capped).unwrap(),
            1e-12
        );
    }

    #[test]
    fn test_honer() {
        let c = row(&[2.0, 300.0]);
        let v = EquationForm::Honer.evaluate(&c, &full_measurement()).unwrap();
        assert_approx_eq!(v, 144.0 / (2.0 + 300.0 / 70.0), 1e-9);
    }

    #[test]
    fn test_honer_negative_denominator_floors() {
        let c = row(&[-10.0, 100.0]);
        let m = Measurement::new().with_dbh(8.0).with_height(50.0);
        assert_eq!(EquationForm::Honer.evaluate(&c, &m).unwrap(), SMALL_FLOOR);
    }

    #[test]
    fn test_pending_is_not_implemented() {
        let c = row(&[]);
        let err = EquationForm::Pending("sapling volume").evaluate(&c, &full_measurement()).unwrap_err();
        assert!(matches!(err, EstimatorError::NotImplemented(_)));
        assert!(err.to_string().contains("sapling volume"));
    }

    #[test]
    fn test_every_form_reads_only_declared_coefficients() {
        let m = full_measurement();
        for form in ALL_FORMS {
            let mut c = VolumeCoefficients::new("TEST", 1);
            for coef in form.coefficients() {
                c = c.with(*coef, 0.5);
            }
            assert!(form.raw(&c, &m).is_ok(), "{form}");
        }
    }

    #[test]
    fn test_every_form_fails_on_missing_declared_coefficient() {
        let m = full_measurement();
        for form in ALL_FORMS {
            for skipped in form.coefficients() {
                let mut c = VolumeCoefficients::new("TEST", 1);
                for coef in form.coefficients().iter().filter(|c| *c != skipped) {
                    c = c.with(*coef, 0.5);
                }
                let err = form.raw(&c, &m).unwrap_err();
                assert!(matches!(err, EstimatorError::NotFound(_)), "{form} {skipped}");
            }
        }
    }

    #[test]
    fn test_display_includes_cutoff() {
        assert_eq!(
            EquationForm::SegmentedDbh { cutoff: 21.0 }.to_string(),
            "segmented-dbh (cutoff 21 in)"
        );
        assert_eq!(EquationForm::Honer.to_string(), "honer");
    }
}
