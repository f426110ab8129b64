use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;

/// A tree attribute that an equation form may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Input {
    Dbh,
    Height,
    BasalArea,
    SiteIndex,
    Stems,
    Drc,
    BoleHeight,
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Dbh => write!(f, "dbh"),
            Input::Height => write!(f, "height"),
            Input::BasalArea => write!(f, "basal area"),
            Input::SiteIndex => write!(f, "site index"),
            Input::Stems => write!(f, "stem count"),
            Input::Drc => write!(f, "diameter at root collar"),
            Input::BoleHeight => write!(f, "bole height"),
        }
    }
}

/// Measured attributes of a single tree for one evaluation call.
///
/// Units: diameters in inches, heights in feet, basal area in sq ft/acre,
/// site index in feet at base age.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Diameter at breast height
    #[serde(default)]
    pub dbh: Option<f64>,
    /// Total height
    #[serde(default)]
    pub height: Option<f64>,
    /// Stand basal area
    #[serde(default)]
    pub basal_area: Option<f64>,
    /// Site index
    #[serde(default)]
    pub site_index: Option<f64>,
    /// Number of qualifying stems (woodland species)
    #[serde(default)]
    pub stems: Option<u32>,
    /// Diameter at root collar (woodland species)
    #[serde(default)]
    pub drc: Option<f64>,
    /// Bole (merchantable) height
    #[serde(default)]
    pub bole_height: Option<f64>,
}

impl Measurement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dbh(mut self, dbh: f64) -> Self {
        self.dbh = Some(dbh);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_basal_area(mut self, basal_area: f64) -> Self {
        self.basal_area = Some(basal_area);
        self
    }

    pub fn with_site_index(mut self, site_index: f64) -> Self {
        self.site_index = Some(site_index);
        self
    }

    pub fn with_stems(mut self, stems: u32) -> Self {
        self.stems = Some(stems);
        self
    }

    pub fn with_drc(mut self, drc: f64) -> Self {
        self.drc = Some(drc);
        self
    }

    pub fn with_bole_height(mut self, bole_height: f64) -> Self {
        self.bole_height = Some(bole_height);
        self
    }

    /// Whether the given input was supplied, regardless of its value.
    pub fn has(&self, input: Input) -> bool {
        match input {
            Input::Dbh => self.dbh.is_some(),
            Input::Height => self.height.is_some(),
            Input::BasalArea => self.basal_area.is_some(),
            Input::SiteIndex => self.site_index.is_some(),
            Input::Stems => self.stems.is_some(),
            Input::Drc => self.drc.is_some(),
            Input::BoleHeight => self.bole_height.is_some(),
        }
    }

    /// Fetch a mandatory input, failing if it is absent or not a positive number.
    pub fn require(&self, input: Input) -> Result<f64, EstimatorError> {
        let value = match input {
            Input::Dbh => self.dbh,
            Input::Height => self.height,
            Input::BasalArea => self.basal_area,
            Input::SiteIndex => self.site_index,
            Input::Stems => self.stems.map(f64::from),
            Input::Drc => self.drc,
            Input::BoleHeight => self.bole_height,
        };
        let value = value.ok_or_else(|| EstimatorError::missing_input(input))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(EstimatorError::ValidationError(format!(
                "{input} must be positive, got {value}"
            )));
        }
        Ok(value)
    }

    /// Check every input in `inputs`, reporting the first one that fails.
    pub fn require_all(&self, inputs: &[Input]) -> Result<(), EstimatorError> {
        for input in inputs {
            self.require(*input)?;
        }
        Ok(())
    }
}
