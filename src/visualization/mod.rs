mod charts;
mod tables;

pub use charts::format_biomass_chart;
pub use tables::{
    format_batch_summary, format_estimates_table, format_species_record, format_tree_estimate,
    format_volume_estimate, format_volume_explanation,
};
