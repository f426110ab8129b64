//! Ordered equation-selection tables, one per region table.
//!
//! Rules are tried top to bottom and the first match wins, so narrow rules
//! (specific species, sub-regions, diameter ranges) sit above the broad
//! softwood/hardwood fallbacks they overlap with.

use super::forms::EquationForm;
use super::region::RegionTable;
use crate::models::{Input, Measurement};

/// FIA species codes below this value are softwoods.
pub const FIRST_HARDWOOD_CODE: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionMatch {
    Any,
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeciesMatch {
    Any,
    OneOf(&'static [i64]),
    Softwood,
    Hardwood,
}

/// Diameter predicate. An absent DBH never satisfies a bounded predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiameterMatch {
    Any,
    Below(f64),
    AtLeast(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMatch {
    Any,
    Present(Input),
}

/// One row of a region's selection table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquationRule {
    pub label: &'static str,
    pub regions: RegionMatch,
    pub species: SpeciesMatch,
    pub diameter: DiameterMatch,
    pub inputs: InputMatch,
    pub form: EquationForm,
}

impl RegionMatch {
    pub fn matches(&self, region_id: &str) -> bool {
        match self {
            RegionMatch::Any => true,
            RegionMatch::OneOf(ids) => ids.contains(&region_id),
        }
    }
}

impl SpeciesMatch {
    pub fn matches(&self, species_cd: i64) -> bool {
        match self {
            SpeciesMatch::Any => true,
            SpeciesMatch::OneOf(codes) => codes.contains(&species_cd),
            SpeciesMatch::Softwood => species_cd > 0 && species_cd < FIRST_HARDWOOD_CODE,
            SpeciesMatch::Hardwood => species_cd >= FIRST_HARDWOOD_CODE,
        }
    }
}

impl DiameterMatch {
    pub fn matches(&self, dbh: Option<f64>) -> bool {
        match (self, dbh) {
            (DiameterMatch::Any, _) => true,
            (DiameterMatch::Below(limit), Some(d)) => d < *limit,
            (DiameterMatch::AtLeast(limit), Some(d)) => d >= *limit,
            (_, None) => false,
        }
    }
}

impl InputMatch {
    pub fn matches(&self, m: &Measurement) -> bool {
        match self {
            InputMatch::Any => true,
            InputMatch::Present(input) => m.has(*input),
        }
    }
}

impl EquationRule {
    /// Pure predicate over (region, effective species, measurement).
    pub fn matches(&self, region_id: &str, species_cd: i64, m: &Measurement) -> bool {
        self.regions.matches(region_id)
            && self.species.matches(species_cd)
            && self.diameter.matches(m.dbh)
            && self.inputs.matches(m)
    }
}

const fn rule(
    label: &'static str,
    regions: RegionMatch,
    species: SpeciesMatch,
    form: EquationForm,
) -> EquationRule {
    EquationRule {
        label,
        regions,
        species,
        diameter: DiameterMatch::Any,
        inputs: InputMatch::Any,
        form,
    }
}

const SOUTHERN_YELLOW_PINES: &[i64] = &[110, 111, 121, 131];
const SOUTHERN_LARGE_SOFTWOODS: &[i64] = &[122, 126, 132];

const PLAINS_JUNIPERS: &[i64] = &[66, 68];

/// Pinyons, junipers, and woodland oaks measured at the root collar.
const WOODLAND_SPECIES: &[i64] = &[57, 58, 59, 62, 63, 65, 66, 69, 106, 133, 140, 143, 803, 810, 814];
const SOUTHWEST_REGIONS: &[&str] = &["S22LAZN", "S22LAZS", "S22LNMN", "S22LNMS"];

const WESTSIDE_REGIONS: &[&str] = &["S26LORW", "S26LWAW"];
const WESTSIDE_CONIFERS: &[i64] = &[202, 263];

pub static NORTHEAST_RULES: &[EquationRule] = &[
    rule(
        "NE softwoods (Scott 1981)",
        RegionMatch::Any,
        SpeciesMatch::Softwood,
        EquationForm::ScottBoleHeight,
    ),
    rule(
        "NE hardwoods (Scott 1981)",
        RegionMatch::Any,
        SpeciesMatch::Hardwood,
        EquationForm::ScottBoleHeight,
    ),
];

pub static SOUTH_RULES: &[EquationRule] = &[
    rule(
        "Table 2 Row 1",
        RegionMatch::Any,
        SpeciesMatch::OneOf(SOUTHERN_YELLOW_PINES),
        EquationForm::PowerModel,
    ),
    rule(
        "Table 2 Row 4",
        RegionMatch::Any,
        SpeciesMatch::OneOf(SOUTHERN_LARGE_SOFTWOODS),
        EquationForm::SegmentedDbh { cutoff: 21.0 },
    ),
    rule(
        "Table 2 Row 2",
        RegionMatch::Any,
        SpeciesMatch::Softwood,
        EquationForm::CombinedVariable,
    ),
    rule(
        "Table 2 Row 3",
        RegionMatch::Any,
        SpeciesMatch::Hardwood,
        EquationForm::LogLinear,
    ),
];

pub static CENTRAL_RULES: &[EquationRule] = &[
    rule(
        "Plains junipers",
        RegionMatch::OneOf(&["S23LPS"]),
        SpeciesMatch::OneOf(PLAINS_JUNIPERS),
        EquationForm::CappedDiameter,
    ),
    EquationRule {
        label: "Saplings below 5.0 in",
        regions: RegionMatch::Any,
        species: SpeciesMatch::Any,
        diameter: DiameterMatch::Below(5.0),
        inputs: InputMatch::Any,
        form: EquationForm::Pending("gross volume for trees below 5.0 in DBH"),
    },
    rule(
        "Hahn 1984 site index/basal area",
        RegionMatch::Any,
        SpeciesMatch::Any,
        EquationForm::HahnSiteIndex,
    ),
];

pub static ROCKY_MOUNTAIN_RULES: &[EquationRule] = &[
    EquationRule {
        label: "Woodland multi-stem (Chojnacky)",
        regions: RegionMatch::Any,
        species: SpeciesMatch::OneOf(WOODLAND_SPECIES),
        diameter: DiameterMatch::Any,
        inputs: InputMatch::Present(Input::Stems),
        form: EquationForm::MultiStemCubeRoot,
    },
    rule(
        "Woodland single-stem (Chojnacky)",
        RegionMatch::Any,
        SpeciesMatch::OneOf(WOODLAND_SPECIES),
        EquationForm::DrcPiecewise,
    ),
    rule(
        "Aspen (Edminster)",
        RegionMatch::Any,
        SpeciesMatch::OneOf(&[746]),
        EquationForm::CappedDiameter,
    ),
    rule(
        "Southwestern ponderosa pine",
        RegionMatch::OneOf(SOUTHWEST_REGIONS),
        SpeciesMatch::OneOf(&[122]),
        EquationForm::PowerModel,
    ),
    rule(
        "Rocky Mountain softwoods (Kemp)",
        RegionMatch::Any,
        SpeciesMatch::Softwood,
        EquationForm::CappedLogLinear,
    ),
    rule(
        "Rocky Mountain hardwoods",
        RegionMatch::Any,
        SpeciesMatch::Hardwood,
        EquationForm::CombinedVariable,
    ),
];

pub static PACIFIC_NORTHWEST_RULES: &[EquationRule] = &[
    rule(
        "California hardwoods",
        RegionMatch::OneOf(&["S26LCA"]),
        SpeciesMatch::Hardwood,
        EquationForm::Pending("California hardwood volume rows"),
    ),
    rule(
        "California softwoods (Wensel & Olson)",
        RegionMatch::OneOf(&["S26LCA"]),
        SpeciesMatch::Softwood,
        EquationForm::PowerModel,
    ),
    rule(
        "Red alder (Curtis)",
        RegionMatch::Any,
        SpeciesMatch::OneOf(&[351]),
        EquationForm::Honer,
    ),
    EquationRule {
        label: "Westside small conifers",
        regions: RegionMatch::OneOf(WESTSIDE_REGIONS),
        species: SpeciesMatch::OneOf(WESTSIDE_CONIFERS),
        diameter: DiameterMatch::Below(6.0),
        inputs: InputMatch::Any,
        form: EquationForm::CombinedVariable,
    },
    rule(
        "PNW softwoods (Brackett)",
        RegionMatch::Any,
        SpeciesMatch::Softwood,
        EquationForm::LogLinear,
    ),
    rule(
        "PNW hardwoods",
        RegionMatch::Any,
        SpeciesMatch::Hardwood,
        EquationForm::CappedDiameter,
    ),
];

/// Selection table for a region table.
pub fn rules_for(table: RegionTable) -> &'static [EquationRule] {
    match table {
        RegionTable::Northeast => NORTHEAST_RULES,
        RegionTable::South => SOUTH_RULES,
        RegionTable::CentralLakePlains => CENTRAL_RULES,
        RegionTable::RockyMountain => ROCKY_MOUNTAIN_RULES,
        RegionTable::PacificNorthwest => PACIFIC_NORTHWEST_RULES,
    }
}

/// First rule in `rules` that matches, if any.
pub fn first_match<'a>(
    rules: &'a [EquationRule],
    region_id: &str,
    species_cd: i64,
    m: &Measurement,
) -> Option<&'a EquationRule> {
    rules.iter().find(|r| r.matches(region_id, species_cd, m))
}
