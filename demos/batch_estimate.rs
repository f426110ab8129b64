//! Batch example: estimate a small CSV of mixed southern trees and print the
//! per-tree table and totals.
//!
//! Run from the project root:
//!   cargo run --example batch_estimate

use tree_estimator::analysis::{estimate_batch, BatchSummary, Estimator};
use tree_estimator::io::read_trees_csv_from_bytes;
use tree_estimator::models::{SpeciesRecord, VolumeCoefficients};
use tree_estimator::store::SqliteStore;
use tree_estimator::visualization::{format_batch_summary, format_estimates_table};
use tree_estimator::MemoryStore;

const TREES: &str = "tree_id,species_cd,region,dbh,height
1,131,S33,9.4,62
2,131,S33,14.1,78
3,611,S33,11.0,70
4,131,S99,12.0,70
5,131,,8.0,55
";

fn loblolly() -> SpeciesRecord {
    SpeciesRecord {
        species_cd: 131,
        common_name: Some("loblolly pine".to_string()),
        jenkins_total_b1: Some(-2.5356),
        jenkins_total_b2: Some(2.4349),
        jenkins_stem_wood_ratio_b1: Some(-0.3737),
        jenkins_stem_wood_ratio_b2: Some(-1.8055),
        jenkins_stem_bark_ratio_b1: Some(-2.0980),
        jenkins_stem_bark_ratio_b2: Some(-1.1432),
        jenkins_foliage_ratio_b1: Some(-2.9584),
        jenkins_foliage_ratio_b2: Some(4.4766),
        jenkins_root_ratio_b1: Some(-1.5619),
        jenkins_root_ratio_b2: Some(0.6614),
        ..Default::default()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let reference = MemoryStore::new()
        .with_species(loblolly())
        .with_mapping(131, "S33", 131)
        .with_mapping(611, "S33", 611)
        .with_coefficients(VolumeCoefficients::from_values("S33", 131, &[0.0023, 1.95, 1.0]))
        .with_coefficients(VolumeCoefficients::from_values(
            "S33",
            611,
            &[-2.6, 1.9, 1.0, 0.0],
        ));

    let mut store = SqliteStore::open_in_memory()?;
    store.import(&reference)?;
    let estimator = Estimator::new(store);

    let trees = read_trees_csv_from_bytes(TREES.as_bytes())?;
    let estimates = estimate_batch(&estimator, &trees);

    print!("{}", format_estimates_table(&estimates, 1));
    for est in estimates.iter().filter(|e| !e.is_complete()) {
        for e in &est.errors {
            println!("  tree {}: {e}", est.tree_id);
        }
    }
    print!("{}", format_batch_summary(&BatchSummary::from_estimates(&estimates), 1));
    Ok(())
}
