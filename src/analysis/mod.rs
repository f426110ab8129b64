mod batch;
mod estimator;

pub use batch::{estimate_batch, BatchSummary};
pub use estimator::{Estimator, VolumeExplanation};
