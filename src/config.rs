use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::biomass::StumpAdjustment;
use crate::error::EstimatorError;
use crate::volume::{normalize_region, RegionTable};

pub const DEFAULT_DATABASE: &str = "coefficients.db";
pub const DEFAULT_PRECISION: usize = 2;

/// Settings read from a TOML file, e.g.
///
/// ```toml
/// database = "data/fia_coefficients.db"
/// stump_adjustment = 1.0
/// default_region = "S26LORW"
/// precision = 3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorConfig {
    /// Path of the SQLite coefficient database
    pub database: PathBuf,
    /// Fixed stump adjustment factor; stump and top biomass are unavailable without one
    pub stump_adjustment: Option<f64>,
    /// Region used for volume when a tree record carries none
    pub default_region: Option<String>,
    /// Decimal places in table output
    pub precision: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            stump_adjustment: None,
            default_region: None,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl EstimatorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, EstimatorError> {
        let config: EstimatorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EstimatorError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, EstimatorError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), EstimatorError> {
        if let Some(f) = self.stump_adjustment {
            StumpAdjustment::Fixed(f).factor()?;
        }
        if let Some(region) = &self.default_region {
            RegionTable::classify(&normalize_region(region))?;
        }
        if self.precision > 10 {
            return Err(EstimatorError::ValidationError(format!(
                "precision must be at most 10, got {}",
                self.precision
            )));
        }
        Ok(())
    }

    pub fn stump_adjustment(&self) -> StumpAdjustment {
        StumpAdjustment::from(self.stump_adjustment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EstimatorConfig::default();
        assert_eq!(config.database, PathBuf::from("coefficients.db"));
        assert_eq!(config.precision, 2);
        assert_eq!(config.stump_adjustment(), StumpAdjustment::Pending);
    }

    #[test]
    fn test_parse_full() {
        let config = EstimatorConfig::from_toml_str(
            r#"
            database = "ref/fia.db"
            stump_adjustment = 0.95
            default_region = "s26lorw"
            precision = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.database, PathBuf::from("ref/fia.db"));
        assert_eq!(config.stump_adjustment(), StumpAdjustment::Fixed(0.95));
        assert_eq!(config.default_region.as_deref(), Some("s26lorw"));
        assert_eq!(config.precision, 3);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = EstimatorConfig::from_toml_str("precision = 4").unwrap();
        assert_eq!(config.database, PathBuf::from(DEFAULT_DATABASE));
        assert!(config.default_region.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EstimatorConfig::from_toml_str("databse = \"x.db\"").unwrap_err();
        assert!(matches!(err, EstimatorError::Config(_)));
    }

    #[test]
    fn test_negative_adjustment_rejected() {
        let err = EstimatorConfig::from_toml_str("stump_adjustment = -1.0").unwrap_err();
        assert!(matches!(err, EstimatorError::ValidationError(_)));
    }

    #[test]
    fn test_unknown_default_region_rejected() {
        let err = EstimatorConfig::from_toml_str("default_region = \"S99\"").unwrap_err();
        assert!(matches!(err, EstimatorError::UnknownRegion(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database = \"other.db\"").unwrap();
        let config = EstimatorConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.database, PathBuf::from("other.db"));
        assert_eq!(EstimatorConfig::load(None).unwrap(), EstimatorConfig::default());
    }
}
