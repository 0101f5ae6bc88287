use thiserror::Error;

/// Top-level error type for scuttle.
#[derive(Debug, Error)]
pub enum ScuttleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("At least one limb is required")]
    NoLimbs,

    #[error("Duplicate limb name: {0}")]
    DuplicateLimb(String),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while wiring an agent to its scene, reported once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("No effector entity for limb {0}")]
    EffectorNotFound(String),

    #[error("No entity carries the locomotion agent marker")]
    AgentNotFound,

    #[error("Limb index {index} out of range (agent has {count} limbs)")]
    LimbOutOfRange { index: usize, count: usize },
}
