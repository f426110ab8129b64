use serde::Serialize;
use tracing::debug;

use super::Estimator;
use crate::models::{TreeEstimate, TreeRecord};
use crate::store::CoefficientStore;

/// Totals over a batch. Only quantities that were computed contribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub trees: usize,
    pub complete: usize,
    pub with_errors: usize,
    pub error_count: usize,
    pub total_ag_lbs: f64,
    pub bole_lbs: f64,
    pub root_lbs: f64,
    pub gross_volume_cuft: f64,
}

impl BatchSummary {
    pub fn from_estimates(estimates: &[TreeEstimate]) -> Self {
        let mut summary = BatchSummary {
            trees: estimates.len(),
            ..Default::default()
        };
        for est in estimates {
            if est.is_complete() {
                summary.complete += 1;
            } else {
                summary.with_errors += 1;
                summary.error_count += est.errors.len();
            }
            summary.total_ag_lbs += est.total_ag_lbs.unwrap_or(0.0);
            summary.bole_lbs += est.bole_lbs.unwrap_or(0.0);
            summary.root_lbs += est.root_lbs.unwrap_or(0.0);
            summary.gross_volume_cuft += est.gross_volume_cuft.unwrap_or(0.0);
        }
        summary
    }
}

/// Estimate every tree independently; one tree failing never stops the rest.
pub fn estimate_batch<S: CoefficientStore>(
    estimator: &Estimator<S>,
    trees: &[TreeRecord],
) -> Vec<TreeEstimate> {
    let estimates: Vec<TreeEstimate> = trees.iter().map(|t| estimator.estimate_tree(t)).collect();
    debug!(
        trees = estimates.len(),
        failed = estimates.iter().filter(|e| !e.is_complete()).count(),
        "batch estimated"
    );
    estimates
}
