mod coefficients;
mod measurement;
mod species;
mod tree;

pub use coefficients::{Coef, VolumeCoefficients, NUM_COEFFICIENTS};
pub use measurement::{Input, Measurement};
pub use species::{BiomassComponent, SpeciesRecord};
pub use tree::{TreeEstimate, TreeRecord};
