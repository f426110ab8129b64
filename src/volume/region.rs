use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;

pub const NORTHEAST_REGIONS: &[&str] = &["S24"];
pub const SOUTH_REGIONS: &[&str] = &["S33"];
pub const CENTRAL_REGIONS: &[&str] = &["S23LCS", "S23LLS", "S23LPS"];
pub const ROCKY_MOUNTAIN_REGIONS: &[&str] = &[
    "S22LAZN", "S22LAZS", "S22LCOE", "S22LCOW", "S22LID", "S22LMT", "S22LNMN", "S22LNMS",
    "S22LNV", "S22LUT", "S22LWYE", "S22LWYW",
];
pub const PACIFIC_NORTHWEST_REGIONS: &[&str] = &["S26LCA", "S26LORE", "S26LORW", "S26LWAE", "S26LWAW"];
/// Alaska sub-regions: recognized, but no volume equations are carried for them.
pub const ALASKA_REGIONS: &[&str] = &["S27LAK", "S27LAKC", "S27LAKI"];

/// The regional equation table a region identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionTable {
    Northeast,
    South,
    CentralLakePlains,
    RockyMountain,
    PacificNorthwest,
}

impl RegionTable {
    pub const ALL: [RegionTable; 5] = [
        RegionTable::Northeast,
        RegionTable::South,
        RegionTable::CentralLakePlains,
        RegionTable::RockyMountain,
        RegionTable::PacificNorthwest,
    ];

    /// Region identifiers served by this table.
    pub fn regions(self) -> &'static [&'static str] {
        match self {
            RegionTable::Northeast => NORTHEAST_REGIONS,
            RegionTable::South => SOUTH_REGIONS,
            RegionTable::CentralLakePlains => CENTRAL_REGIONS,
            RegionTable::RockyMountain => ROCKY_MOUNTAIN_REGIONS,
            RegionTable::PacificNorthwest => PACIFIC_NORTHWEST_REGIONS,
        }
    }

    /// Resolve a (normalized) region identifier to its table.
    ///
    /// Alaska identifiers fail with `UnsupportedRegion`; anything else that
    /// is not listed fails with `UnknownRegion`.
    pub fn classify(region_id: &str) -> Result<Self, EstimatorError> {
        let id = normalize_region(region_id);
        if ALASKA_REGIONS.contains(&id.as_str()) {
            return Err(EstimatorError::UnsupportedRegion(id));
        }
        RegionTable::ALL
            .into_iter()
            .find(|table| table.regions().contains(&id.as_str()))
            .ok_or(EstimatorError::UnknownRegion(id))
    }
}

impl std::fmt::Display for RegionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionTable::Northeast => write!(f, "Northeast"),
            RegionTable::South => write!(f, "South"),
            RegionTable::CentralLakePlains => write!(f, "Central/Lake/Plains"),
            RegionTable::RockyMountain => write!(f, "Rocky Mountain"),
            RegionTable::PacificNorthwest => write!(f, "Pacific Northwest"),
        }
    }
}

/// Canonical spelling of a region identifier (trimmed, upper case).
pub fn normalize_region(region_id: &str) -> String {
    region_id.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_table() {
        assert_eq!(RegionTable::classify("S24").unwrap(), RegionTable::Northeast);
        assert_eq!(RegionTable::classify("S33").unwrap(), RegionTable::South);
        assert_eq!(RegionTable::classify("S23LPS").unwrap(), RegionTable::CentralLakePlains);
        assert_eq!(RegionTable::classify("S22LMT").unwrap(), RegionTable::RockyMountain);
        assert_eq!(RegionTable::classify("S26LORW").unwrap(), RegionTable::PacificNorthwest);
    }

    #[test]
    fn test_classify_normalizes_case_and_whitespace() {
        assert_eq!(RegionTable::classify(" s26lca ").unwrap(), RegionTable::PacificNorthwest);
    }

    #[test]
    fn test_classify_unknown_region() {
        let err = RegionTable::classify("S99").unwrap_err();
        assert!(matches!(err, EstimatorError::UnknownRegion(ref r) if r == "S99"));
        assert!(matches!(RegionTable::classify(""), Err(EstimatorError::UnknownRegion(_))));
    }

    #[test]
    fn test_classify_alaska_is_unsupported() {
        for id in ALASKA_REGIONS {
            let err = RegionTable::classify(id).unwrap_err();
            assert!(matches!(err, EstimatorError::UnsupportedRegion(_)), "{id}");
        }
    }

    #[test]
    fn test_region_lists_are_disjoint() {
        let mut all: Vec<&str> = RegionTable::ALL.iter().flat_map(|t| t.regions().iter().copied()).collect();
        all.extend(ALASKA_REGIONS);
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn test_display() {
        assert_eq!(RegionTable::CentralLakePlains.to_string(), "Central/Lake/Plains");
        assert_eq!(RegionTable::PacificNorthwest.to_string(), "Pacific Northwest");
    }
}
