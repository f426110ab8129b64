use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;

/// Biomass components estimated as a ratio of total above-ground biomass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiomassComponent {
    Stem,
    Bark,
    Foliage,
    Root,
}

impl BiomassComponent {
    pub const ALL: [BiomassComponent; 4] = [
        BiomassComponent::Stem,
        BiomassComponent::Bark,
        BiomassComponent::Foliage,
        BiomassComponent::Root,
    ];
}

impl std::fmt::Display for BiomassComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BiomassComponent::Stem => write!(f, "Stem"),
            BiomassComponent::Bark => write!(f, "Bark"),
            BiomassComponent::Foliage => write!(f, "Foliage"),
            BiomassComponent::Root => write!(f, "Root"),
        }
    }
}

impl std::str::FromStr for BiomassComponent {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stem" | "wood" | "stem_wood" => Ok(BiomassComponent::Stem),
            "bark" | "stem_bark" => Ok(BiomassComponent::Bark),
            "foliage" | "leaves" => Ok(BiomassComponent::Foliage),
            "root" | "roots" => Ok(BiomassComponent::Root),
            _ => Err(EstimatorError::ValidationError(format!(
                "Unknown biomass component: '{s}'"
            ))),
        }
    }
}

/// Reference record for one species, as stored in the `species` relation.
///
/// Every coefficient is optional at rest; formulas ask for the ones they
/// need through [`SpeciesRecord::require`] so an absent value surfaces as a
/// validation failure naming the column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    /// FIA species code (e.g. 746 for quaking aspen)
    pub species_cd: i64,
    /// Common name, if the reference table carries one
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub jenkins_total_b1: Option<f64>,
    #[serde(default)]
    pub jenkins_total_b2: Option<f64>,
    #[serde(default)]
    pub jenkins_stem_wood_ratio_b1: Option<f64>,
    #[serde(default)]
    pub jenkins_stem_wood_ratio_b2: Option<f64>,
    #[serde(default)]
    pub jenkins_stem_bark_ratio_b1: Option<f64>,
    #[serde(default)]
    pub jenkins_stem_bark_ratio_b2: Option<f64>,
    #[serde(default)]
    pub jenkins_foliage_ratio_b1: Option<f64>,
    #[serde(default)]
    pub jenkins_foliage_ratio_b2: Option<f64>,
    #[serde(default)]
    pub jenkins_root_ratio_b1: Option<f64>,
    #[serde(default)]
    pub jenkins_root_ratio_b2: Option<f64>,
    /// Raile (1982) outside-bark stump taper coefficient
    #[serde(default)]
    pub raile_stump_dob_b1: Option<f64>,
    /// Raile (1982) inside-bark stump taper coefficients
    #[serde(default)]
    pub raile_stump_dib_b1: Option<f64>,
    #[serde(default)]
    pub raile_stump_dib_b2: Option<f64>,
    /// Wood specific gravity (green volume, oven-dry weight)
    #[serde(default)]
    pub wood_spgr_greenvol_drywt: Option<f64>,
    /// Bark specific gravity (green volume, oven-dry weight)
    #[serde(default)]
    pub bark_spgr_greenvol_drywt: Option<f64>,
}

impl SpeciesRecord {
    /// Column names of the `species` relation, in schema order.
    pub const COLUMNS: [&'static str; 17] = [
        "species_cd",
        "common_name",
        "jenkins_total_b1",
        "jenkins_total_b2",
        "jenkins_stem_wood_ratio_b1",
        "jenkins_stem_wood_ratio_b2",
        "jenkins_stem_bark_ratio_b1",
        "jenkins_stem_bark_ratio_b2",
        "jenkins_foliage_ratio_b1",
        "jenkins_foliage_ratio_b2",
        "jenkins_root_ratio_b1",
        "jenkins_root_ratio_b2",
        "raile_stump_dob_b1",
        "raile_stump_dib_b1",
        "raile_stump_dib_b2",
        "wood_spgr_greenvol_drywt",
        "bark_spgr_greenvol_drywt",
    ];

    /// Return a coefficient or a validation error naming the missing column.
    pub fn require(&self, name: &str, value: Option<f64>) -> Result<f64, EstimatorError> {
        match value {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(EstimatorError::ValidationError(format!(
                "species {}: {name} must be a number, got {v}",
                self.species_cd
            ))),
            None => Err(EstimatorError::ValidationError(format!(
                "species {}: {name} is missing",
                self.species_cd
            ))),
        }
    }

    /// Jenkins ratio coefficient pair for the given component.
    pub fn ratio_coefficients(
        &self,
        component: BiomassComponent,
    ) -> Result<(f64, f64), EstimatorError> {
        let (b1, b2, n1, n2) = match component {
            BiomassComponent::Stem => (
                self.jenkins_stem_wood_ratio_b1,
                self.jenkins_stem_wood_ratio_b2,
                "jenkins_stem_wood_ratio_b1",
                "jenkins_stem_wood_ratio_b2",
            ),
            BiomassComponent::Bark => (
                self.jenkins_stem_bark_ratio_b1,
                self.jenkins_stem_bark_ratio_b2,
                "jenkins_stem_bark_ratio_b1",
                "jenkins_stem_bark_ratio_b2",
            ),
            BiomassComponent::Foliage => (
                self.jenkins_foliage_ratio_b1,
                self.jenkins_foliage_ratio_b2,
                "jenkins_foliage_ratio_b1",
                "jenkins_foliage_ratio_b2",
            ),
            BiomassComponent::Root => (
                self.jenkins_root_ratio_b1,
                self.jenkins_root_ratio_b2,
                "jenkins_root_ratio_b1",
                "jenkins_root_ratio_b2",
            ),
        };
        Ok((self.require(n1, b1)?, self.require(n2, b2)?))
    }

    /// Display label, e.g. "746 (quaking aspen)".
    pub fn label(&self) -> String {
        match &self.common_name {
            Some(name) => format!("{} ({})", self.species_cd, name),
            None => self.species_cd.to_string(),
        }
    }
}

impl std::fmt::Display for SpeciesRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aspen() -> SpeciesRecord {
        SpeciesRecord {
            species_cd: 746,
            common_name: Some("quaking aspen".to_string()),
            jenkins_stem_wood_ratio_b1: Some(-0.3065),
            jenkins_stem_wood_ratio_b2: Some(-5.4240),
            jenkins_root_ratio_b1: Some(-1.6911),
            jenkins_root_ratio_b2: None,
            ..Default::default()
        }
    }

    #[test]
    fn test_component_display() {
        assert_eq!(BiomassComponent::Stem.to_string(), "Stem");
        assert_eq!(BiomassComponent::Bark.to_string(), "Bark");
        assert_eq!(BiomassComponent::Foliage.to_string(), "Foliage");
        assert_eq!(BiomassComponent::Root.to_string(), "Root");
    }

    #[test]
    fn test_component_parse_case_insensitive() {
        assert_eq!("STEM".parse::<BiomassComponent>().unwrap(), BiomassComponent::Stem);
        assert_eq!("bark".parse::<BiomassComponent>().unwrap(), BiomassComponent::Bark);
        assert_eq!("Foliage".parse::<BiomassComponent>().unwrap(), BiomassComponent::Foliage);
        assert_eq!("roots".parse::<BiomassComponent>().unwrap(), BiomassComponent::Root);
    }

    #[test]
    fn test_component_parse_invalid() {
        assert!("branch".parse::<BiomassComponent>().is_err());
        assert!("".parse::<BiomassComponent>().is_err());
    }

    #[test]
    fn test_ratio_coefficients_present() {
        let (b1, b2) = aspen().ratio_coefficients(BiomassComponent::Stem).unwrap();
        assert_eq!(b1, -0.3065);
        assert_eq!(b2, -5.4240);
    }

    #[test]
    fn test_ratio_coefficients_missing_names_column() {
        let err = aspen().ratio_coefficients(BiomassComponent::Root).unwrap_err();
        assert!(matches!(err, EstimatorError::ValidationError(_)));
        assert!(err.to_string().contains("jenkins_root_ratio_b2"));
    }

    #[test]
    fn test_require_rejects_nan() {
        let sp = aspen();
        let err = sp.require("jenkins_total_b1", Some(f64::NAN)).unwrap_err();
        assert!(err.to_string().contains("must be a number"));
    }

    #[test]
    fn test_label_with_and_without_name() {
        assert_eq!(aspen().label(), "746 (quaking aspen)");
        let bare = SpeciesRecord {
            species_cd: 12,
            ..Default::default()
        };
        assert_eq!(bare.to_string(), "12");
    }

    #[test]
    fn test_species_json_missing_fields_default_to_none() {
        let sp: SpeciesRecord = serde_json::from_str(r#"{"species_cd": 316}"#).unwrap();
        assert_eq!(sp.species_cd, 316);
        assert!(sp.jenkins_total_b1.is_none());
    }
}
