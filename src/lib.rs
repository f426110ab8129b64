pub mod analysis;
pub mod biomass;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod store;
pub mod visualization;
pub mod volume;

pub use analysis::{estimate_batch, BatchSummary, Estimator, VolumeExplanation};
pub use biomass::StumpAdjustment;
pub use config::EstimatorConfig;
pub use error::EstimatorError;
pub use io::{EstimateWriter, TreeReader};
pub use models::{
    BiomassComponent, Coef, Measurement, SpeciesRecord, TreeEstimate, TreeRecord,
    VolumeCoefficients,
};
pub use store::{CoefficientStore, MemoryStore, SqliteStore};
pub use volume::{gross_volume, RegionTable};
