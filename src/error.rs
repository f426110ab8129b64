use thiserror::Error;

/// Errors that can occur while looking up coefficients or evaluating equations.
#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown region: '{0}'")]
    UnknownRegion(String),

    #[error("No volume equation for region '{region}', species {species}")]
    UnknownEquation { region: String, species: i64 },

    #[error("Unsupported region: '{0}' is recognized but has no volume equations")]
    UnsupportedRegion(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl EstimatorError {
    /// Shorthand for a missing mandatory measurement.
    pub(crate) fn missing_input(name: impl std::fmt::Display) -> Self {
        EstimatorError::ValidationError(format!(
            "{name} is required for this region/species combination"
        ))
    }
}
