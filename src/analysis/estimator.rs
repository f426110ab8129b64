use serde::Serialize;
use tracing::{debug, trace};

use crate::biomass::{self, BiomassBreakdown, StumpAdjustment};
use crate::error::EstimatorError;
use crate::models::{BiomassComponent, Measurement, SpeciesRecord, TreeEstimate, TreeRecord};
use crate::store::CoefficientStore;
use crate::volume::{self, normalize_region, RegionTable, VolumeEstimate};

/// Which volume equation a tree would be routed to, without evaluating it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeExplanation {
    pub region: String,
    pub table: RegionTable,
    pub species_cd: i64,
    pub eff_species_cd: i64,
    pub rule: &'static str,
    pub form: String,
    pub required_inputs: Vec<String>,
    pub coefficients: Vec<String>,
    pub floor: f64,
}

/// Evaluation API keyed by species code, backed by a coefficient store.
pub struct Estimator<S> {
    store: S,
    stump_adjustment: StumpAdjustment,
    default_region: Option<String>,
}

impl<S: CoefficientStore> Estimator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            stump_adjustment: StumpAdjustment::default(),
            default_region: None,
        }
    }

    pub fn with_stump_adjustment(mut self, adjustment: StumpAdjustment) -> Self {
        self.stump_adjustment = adjustment;
        self
    }

    /// Region used by [`Estimator::estimate_tree`] when a record has none.
    pub fn with_default_region(mut self, region: impl Into<String>) -> Self {
        self.default_region = Some(normalize_region(&region.into()));
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stump_adjustment(&self) -> StumpAdjustment {
        self.stump_adjustment
    }

    pub fn species(&self, species_cd: i64) -> Result<SpeciesRecord, EstimatorError> {
        self.store.species(species_cd)
    }

    /// Total above-ground biomass in pounds.
    pub fn total_above_ground_biomass(&self, species_cd: i64, dbh: f64) -> Result<f64, EstimatorError> {
        biomass::total_above_ground_biomass(&self.species(species_cd)?, dbh)
    }

    pub fn component_biomass(
        &self,
        species_cd: i64,
        dbh: f64,
        component: BiomassComponent,
    ) -> Result<f64, EstimatorError> {
        biomass::component_biomass(&self.species(species_cd)?, dbh, component)
    }

    /// Stem wood plus stem bark, in pounds.
    pub fn bole_biomass(&self, species_cd: i64, dbh: f64) -> Result<f64, EstimatorError> {
        biomass::bole_biomass(&self.species(species_cd)?, dbh)
    }

    pub fn stump_biomass(&self, species_cd: i64, dbh: f64) -> Result<f64, EstimatorError> {
        biomass::stump_biomass(&self.species(species_cd)?, dbh, self.stump_adjustment)
    }

    pub fn top_biomass(&self, species_cd: i64, dbh: f64, height: f64) -> Result<f64, EstimatorError> {
        biomass::top_biomass(&self.species(species_cd)?, dbh, height, self.stump_adjustment)
    }

    pub fn biomass_breakdown(
        &self,
        species_cd: i64,
        dbh: f64,
        height: f64,
    ) -> Result<BiomassBreakdown, EstimatorError> {
        BiomassBreakdown::compute(&self.species(species_cd)?, dbh, height, self.stump_adjustment)
    }

    /// Gross cubic-foot volume: region species mapping, then the regional
    /// coefficient row, then the dispatched equation.
    pub fn gross_volume(
        &self,
        species_cd: i64,
        region: &str,
        m: &Measurement,
    ) -> Result<f64, EstimatorError> {
        Ok(self.estimate_volume(species_cd, region, m)?.gross_volume_cuft)
    }

    pub fn estimate_volume(
        &self,
        species_cd: i64,
        region: &str,
        m: &Measurement,
    ) -> Result<VolumeEstimate, EstimatorError> {
        let region = normalize_region(region);
        RegionTable::classify(&region)?;
        let eff = self.store.region_species(species_cd, &region)?;
        trace!(species = species_cd, eff_species = eff, region = %region, "mapped species");
        let coefs = self.store.volume_coefficients(eff, &region)?;
        volume::estimate_volume(&region, eff, &coefs, m)
    }

    /// Report the equation row `gross_volume` would apply. Needs the region
    /// species mapping but not the coefficient row.
    pub fn explain_volume(
        &self,
        species_cd: i64,
        region: &str,
        m: &Measurement,
    ) -> Result<VolumeExplanation, EstimatorError> {
        let region = normalize_region(region);
        let table = RegionTable::classify(&region)?;
        let eff = self.store.region_species(species_cd, &region)?;
        let rule = volume::select_rule(&region, eff, m)?;
        Ok(VolumeExplanation {
            region,
            table,
            species_cd,
            eff_species_cd: eff,
            rule: rule.label,
            form: rule.form.to_string(),
            required_inputs: rule.form.required_inputs().iter().map(|i| i.to_string()).collect(),
            coefficients: rule.form.coefficients().iter().map(|c| c.to_string()).collect(),
            floor: rule.form.floor(),
        })
    }

    /// Evaluate every quantity for one tree record. Failures are recorded
    /// per quantity on the result instead of aborting.
    pub fn estimate_tree(&self, tree: &TreeRecord) -> TreeEstimate {
        let region = tree
            .region
            .as_deref()
            .map(normalize_region)
            .or_else(|| self.default_region.clone());
        let mut est = TreeEstimate {
            tree_id: tree.tree_id,
            species_cd: tree.species_cd,
            region: region.clone(),
            ..Default::default()
        };

        if let Err(e) = tree.validate() {
            est.errors.push(e.to_string());
            return est;
        }

        self.fill_biomass(tree, &mut est);

        if let Some(region) = region {
            match self.estimate_volume(tree.species_cd, &region, &tree.measurement()) {
                Ok(v) => {
                    est.gross_volume_cuft = Some(v.gross_volume_cuft);
                    est.volume_equation = Some(v.rule.to_string());
                }
                Err(e) => est.errors.push(format!("volume: {e}")),
            }
        }

        debug!(tree = tree.tree_id, errors = est.errors.len(), "estimated tree");
        est
    }

    fn fill_biomass(&self, tree: &TreeRecord, est: &mut TreeEstimate) {
        let species = match self.species(tree.species_cd) {
            Ok(s) => s,
            Err(e) => {
                est.errors.push(format!("biomass: {e}"));
                return;
            }
        };
        let Some(dbh) = tree.dbh else {
            est.errors
                .push("biomass: dbh is required for biomass estimates".to_string());
            return;
        };

        let mut record = |name: &str, result: Result<f64, EstimatorError>| match result {
            Ok(v) => Some(v),
            Err(e) => {
                est.errors.push(format!("{name}: {e}"));
                None
            }
        };

        let total = record("total", biomass::total_above_ground_biomass(&species, dbh));
        let stem = record(
            "stem",
            biomass::component_biomass(&species, dbh, BiomassComponent::Stem),
        );
        let bark = record(
            "bark",
            biomass::component_biomass(&species, dbh, BiomassComponent::Bark),
        );
        let foliage = record(
            "foliage",
            biomass::component_biomass(&species, dbh, BiomassComponent::Foliage),
        );
        let root = record(
            "root",
            biomass::component_biomass(&species, dbh, BiomassComponent::Root),
        );
        let stump = record(
            "stump",
            biomass::stump_biomass(&species, dbh, self.stump_adjustment),
        );
        // Top is the remainder, so it is only attempted when its parts exist.
        let top = match (total, stem, bark, foliage, stump, tree.height) {
            (Some(t), Some(s), Some(b), Some(f), Some(st), Some(_)) => {
                Some(biomass::top_remainder(t, s, b, f, st))
            }
            (_, _, _, _, _, None) => {
                record("top", Err(EstimatorError::missing_input("height")));
                None
            }
            _ => None,
        };

        est.total_ag_lbs = total;
        est.stem_lbs = stem;
        est.bark_lbs = bark;
        est.bole_lbs = stem.zip(bark).map(|(s, b)| s + b);
        est.foliage_lbs = foliage;
        est.root_lbs = root;
        est.stump_lbs = stump;
        est.top_lbs = top;
    }
}
