use thiserror::Error;

/// Errors raised while validating or loading a simulation configuration.
///
/// A run is a pure function of configuration and seed, so every failure is
/// reported before the first tick and none of them are retryable.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Unknown topology kind: {0}")]
    UnknownTopology(String),

    #[error("Topology '{topology}' requires parameter '{parameter}'")]
    MissingTopologyParameter {
        topology: &'static str,
        parameter: &'static str,
    },

    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    #[error("Population mix covers {available} of {required} traders")]
    PopulationShortfall { required: usize, available: usize },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigurationError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;
