use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;

/// Number of coefficient columns (`b0..b19`) in a regional volume row.
pub const NUM_COEFFICIENTS: usize = 20;

/// Index of a coefficient column in a [`VolumeCoefficients`] row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Coef {
    B0,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8,
    B9,
    B10,
    B11,
    B12,
    B13,
    B14,
    B15,
    B16,
    B17,
    B18,
    B19,
}

impl Coef {
    pub const ALL: [Coef; NUM_COEFFICIENTS] = [
        Coef::B0,
        Coef::B1,
        Coef::B2,
        Coef::B3,
        Coef::B4,
        Coef::B5,
        Coef::B6,
        Coef::B7,
        Coef::B8,
        Coef::B9,
        Coef::B10,
        Coef::B11,
        Coef::B12,
        Coef::B13,
        Coef::B14,
        Coef::B15,
        Coef::B16,
        Coef::B17,
        Coef::B18,
        Coef::B19,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name in the coefficient view, e.g. `b7`.
    pub fn column(self) -> String {
        format!("b{}", self.index())
    }
}

impl std::fmt::Display for Coef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "b{}", self.index())
    }
}

/// One row of the regional volume coefficient view.
///
/// The meaning of each `b` column depends on the equation rule that
/// selected the row; the row itself carries no semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeCoefficients {
    pub region: String,
    pub eff_species_cd: i64,
    pub b: [Option<f64>; NUM_COEFFICIENTS],
}

impl VolumeCoefficients {
    pub fn new(region: impl Into<String>, eff_species_cd: i64) -> Self {
        Self {
            region: region.into(),
            eff_species_cd,
            b: [None; NUM_COEFFICIENTS],
        }
    }

    /// Build a row from a leading slice of values (`b0`, `b1`, ...).
    pub fn from_values(region: impl Into<String>, eff_species_cd: i64, values: &[f64]) -> Self {
        let mut row = Self::new(region, eff_species_cd);
        for (slot, v) in row.b.iter_mut().zip(values) {
            *slot = Some(*v);
        }
        row
    }

    pub fn with(mut self, coef: Coef, value: f64) -> Self {
        self.b[coef.index()] = Some(value);
        self
    }

    /// Fetch a coefficient the current equation form depends on.
    pub fn get(&self, coef: Coef) -> Result<f64, EstimatorError> {
        match self.b[coef.index()] {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(EstimatorError::NotFound(format!(
                "coefficient {coef} for region '{}', species {}",
                self.region, self.eff_species_cd
            ))),
        }
    }

    /// Fetch several coefficients at once, in order.
    pub fn get_many<const N: usize>(&self, coefs: [Coef; N]) -> Result<[f64; N], EstimatorError> {
        let mut out = [0.0; N];
        for (slot, coef) in out.iter_mut().zip(coefs) {
            *slot = self.get(coef)?;
        }
        Ok(out)
    }
}
