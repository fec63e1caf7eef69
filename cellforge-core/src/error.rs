use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetabolismError {
    #[error("Unknown metabolite '{0}'")]
    UnknownMetabolite(String),

    #[error("Unknown enzyme '{0}'")]
    UnknownEnzyme(String),

    #[error("Quantity of '{name}' would become {attempted}, outside [{min}, {max}]")]
    QuantityOutOfRange {
        name: String,
        attempted: f64,
        min: f64,
        max: f64,
    },

    #[error("Insufficient '{name}': requested {requested}, available {available}")]
    InsufficientMetabolite {
        name: String,
        requested: f64,
        available: f64,
    },

    #[error("Reaction '{0}' is blocked")]
    ReactionBlocked(String),

    #[error("Pathway '{pathway}' failed: {source}")]
    PathwayFailed {
        pathway: String,
        #[source]
        source: Box<MetabolismError>,
    },

    #[error("Invalid amount {amount} for '{name}'")]
    InvalidAmount { name: String, amount: f64 },

    #[error("Invalid seed for '{name}': {reason}")]
    InvalidSeed { name: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),

    #[error("An error occurred during logging: {0}")]
    LoggingError(#[from] anyhow::Error),
}

impl MetabolismError {
    pub fn pathway(pathway: &str, source: MetabolismError) -> Self {
        MetabolismError::PathwayFailed {
            pathway: pathway.to_string(),
            source: Box::new(source),
        }
    }

    /// Whether the controller may skip the current tick and carry on.
    ///
    /// Availability and capacity failures are expected during a run. Bad
    /// inputs, configuration mistakes and I/O problems are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MetabolismError::UnknownMetabolite(_)
            | MetabolismError::QuantityOutOfRange { .. }
            | MetabolismError::InsufficientMetabolite { .. }
            | MetabolismError::ReactionBlocked(_) => true,
            MetabolismError::PathwayFailed { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}
