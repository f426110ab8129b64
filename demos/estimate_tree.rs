//! Single-tree example: biomass components and gross volume for a
//! Douglas-fir on the Oregon westside.
//!
//! Run from the project root:
//!   cargo run --example estimate_tree

use tree_estimator::analysis::Estimator;
use tree_estimator::biomass::StumpAdjustment;
use tree_estimator::models::{Measurement, SpeciesRecord, TreeRecord, VolumeCoefficients};
use tree_estimator::store::MemoryStore;
use tree_estimator::visualization::{
    format_biomass_chart, format_tree_estimate, format_volume_explanation,
};

fn douglas_fir() -> SpeciesRecord {
    SpeciesRecord {
        species_cd: 202,
        common_name: Some("Douglas-fir".to_string()),
        jenkins_total_b1: Some(-2.2304),
        jenkins_total_b2: Some(2.4435),
        jenkins_stem_wood_ratio_b1: Some(-0.3737),
        jenkins_stem_wood_ratio_b2: Some(-1.8055),
        jenkins_stem_bark_ratio_b1: Some(-2.0980),
        jenkins_stem_bark_ratio_b2: Some(-1.1432),
        jenkins_foliage_ratio_b1: Some(-2.9584),
        jenkins_foliage_ratio_b2: Some(4.4766),
        jenkins_root_ratio_b1: Some(-1.5619),
        jenkins_root_ratio_b2: Some(0.6614),
        raile_stump_dob_b1: Some(0.16),
        raile_stump_dib_b1: Some(0.911),
        raile_stump_dib_b2: Some(0.129),
        wood_spgr_greenvol_drywt: Some(0.45),
        bark_spgr_greenvol_drywt: Some(0.52),
    }
}

fn main() {
    let store = MemoryStore::new()
        .with_species(douglas_fir())
        .with_mapping(202, "S26LORW", 202)
        .with_coefficients(VolumeCoefficients::from_values(
            "S26LORW",
            202,
            &[-2.7, 1.7, 1.1, 0.0],
        ));
    let estimator = Estimator::new(store).with_stump_adjustment(StumpAdjustment::Fixed(1.0));

    let mut tree = TreeRecord::new(1, 202);
    tree.region = Some("S26LORW".to_string());
    tree.dbh = Some(18.0);
    tree.height = Some(110.0);

    let est = estimator.estimate_tree(&tree);
    print!("{}", format_tree_estimate(&est, "202 (Douglas-fir)", 2));
    print!("{}", format_biomass_chart(&est));

    // A sapling on the same site goes through a different row.
    let sapling = Measurement::new().with_dbh(4.0).with_height(22.0);
    match estimator.explain_volume(202, "S26LORW", &sapling) {
        Ok(ex) => print!("{}", format_volume_explanation(&ex)),
        Err(e) => eprintln!("explain failed: {e}"),
    }
}
