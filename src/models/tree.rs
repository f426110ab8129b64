use serde::{Deserialize, Serialize};

use super::measurement::Measurement;
use crate::error::EstimatorError;

/// A single tree to be estimated, as read from a batch file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    /// Tree identifier within the batch
    pub tree_id: u32,
    /// FIA species code
    pub species_cd: i64,
    /// Volume region identifier (e.g. "S24", "S26LORW")
    #[serde(default)]
    pub region: Option<String>,
    /// Diameter at breast height in inches
    #[serde(default)]
    pub dbh: Option<f64>,
    /// Total height in feet
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub basal_area: Option<f64>,
    #[serde(default)]
    pub site_index: Option<f64>,
    #[serde(default)]
    pub stems: Option<u32>,
    #[serde(default)]
    pub drc: Option<f64>,
    #[serde(default)]
    pub bole_height: Option<f64>,
}

impl TreeRecord {
    pub fn new(tree_id: u32, species_cd: i64) -> Self {
        Self {
            tree_id,
            species_cd,
            region: None,
            dbh: None,
            height: None,
            basal_area: None,
            site_index: None,
            stems: None,
            drc: None,
            bole_height: None,
        }
    }

    /// The measured attributes of this tree as an evaluation input.
    pub fn measurement(&self) -> Measurement {
        Measurement {
            dbh: self.dbh,
            height: self.height,
            basal_area: self.basal_area,
            site_index: self.site_index,
            stems: self.stems,
            drc: self.drc,
            bole_height: self.bole_height,
        }
    }

    /// Validate the record. Returns `EstimatorError::ValidationError` on failure.
    ///
    /// Only values that are present are checked; whether a value is needed
    /// depends on the equation selected later.
    pub fn validate(&self) -> Result<(), EstimatorError> {
        if self.species_cd <= 0 {
            return Err(EstimatorError::ValidationError(format!(
                "Tree {}: species code must be a positive integer, got {}",
                self.tree_id, self.species_cd
            )));
        }
        let positive = [
            ("dbh", self.dbh),
            ("height", self.height),
            ("basal_area", self.basal_area),
            ("site_index", self.site_index),
            ("drc", self.drc),
            ("bole_height", self.bole_height),
        ];
        for (name, value) in positive {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(EstimatorError::ValidationError(format!(
                        "Tree {}: {name} must be positive, got {v}",
                        self.tree_id
                    )));
                }
            }
        }
        if self.stems == Some(0) {
            return Err(EstimatorError::ValidationError(format!(
                "Tree {}: stems must be at least 1",
                self.tree_id
            )));
        }
        if let (Some(bole), Some(height)) = (self.bole_height, self.height) {
            if bole > height {
                return Err(EstimatorError::ValidationError(format!(
                    "Tree {}: bole_height ({bole}) exceeds height ({height})",
                    self.tree_id
                )));
            }
        }
        Ok(())
    }
}

/// Per-tree results. Each quantity is `None` when it could not be computed;
/// the reason is recorded in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeEstimate {
    pub tree_id: u32,
    pub species_cd: i64,
    pub region: Option<String>,
    /// Total above-ground biomass, lb
    pub total_ag_lbs: Option<f64>,
    pub stem_lbs: Option<f64>,
    pub bark_lbs: Option<f64>,
    pub bole_lbs: Option<f64>,
    pub foliage_lbs: Option<f64>,
    pub root_lbs: Option<f64>,
    pub stump_lbs: Option<f64>,
    pub top_lbs: Option<f64>,
    /// Gross cubic-foot volume
    pub gross_volume_cuft: Option<f64>,
    /// Label of the volume equation row that was applied
    pub volume_equation: Option<String>,
    pub errors: Vec<String>,
}

impl TreeEstimate {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tree() -> TreeRecord {
        TreeRecord {
            region: Some("S24".to_string()),
            dbh: Some(12.0),
            height: Some(70.0),
            bole_height: Some(40.0),
            ..TreeRecord::new(1, 316)
        }
    }

    #[test]
    fn test_measurement_copies_fields() {
        let tree = make_tree();
        let m = tree.measurement();
        assert_eq!(m.dbh, Some(12.0));
        assert_eq!(m.height, Some(70.0));
        assert_eq!(m.bole_height, Some(40.0));
        assert!(m.drc.is_none());
    }

    #[test]
    fn test_validate_valid_tree() {
        assert!(make_tree().validate().is_ok());
    }

    #[test]
    fn test_validate_valid_tree_no_optionals() {
        assert!(TreeRecord::new(5, 746).validate().is_ok());
    }

    #[test]
    fn test_validate_non_positive_species() {
        let tree = TreeRecord::new(1, 0);
        let err = tree.validate().unwrap_err();
        assert!(err.to_string().contains("species code must be a positive integer"));
    }

    #[test]
    fn test_validate_zero_dbh() {
        let mut tree = make_tree();
        tree.dbh = Some(0.0);
        let err = tree.validate().unwrap_err();
        assert!(err.to_string().contains("dbh must be positive"));
    }

    #[test]
    fn test_validate_negative_height() {
        let mut tree = make_tree();
        tree.height = Some(-5.0);
        let err = tree.validate().unwrap_err();
        assert!(err.to_string().contains("height must be positive"));
    }

    #[test]
    fn test_validate_zero_stems() {
        let mut tree = make_tree();
        tree.stems = Some(0);
        assert!(tree.validate().unwrap_err().to_string().contains("stems"));
    }

    #[test]
    fn test_validate_bole_above_height() {
        let mut tree = make_tree();
        tree.bole_height = Some(90.0);
        let err = tree.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds height"));
    }

    #[test]
    fn test_tree_json_roundtrip() {
        let tree = make_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let back: TreeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_estimate_completeness() {
        let mut est = TreeEstimate::default();
        assert!(est.is_complete());
        est.errors.push("stump: not implemented".to_string());
        assert!(!est.is_complete());
    }
}
