use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectorError {
    #[error("invalid limb '{0}' (expected left or right)")]
    InvalidLimb(String),
    #[error("unknown exercise '{0}'")]
    UnknownExercise(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing exercise config")]
    MissingExercise,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
