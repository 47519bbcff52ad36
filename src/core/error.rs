//! Error types for the learning and evaluation toolkit

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LearnError {
    #[error("actual and predicted don't have the same length: {actual} != {predicted}")]
    LengthMismatch { actual: usize, predicted: usize },

    #[error("invalid fold count: {folds} (pool holds {pool_size} samples)")]
    InvalidFoldCount { folds: usize, pool_size: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("no classifier builder registered for '{0}'")]
    MissingBuilder(String),

    #[error("corrupt persisted state: {0}")]
    CorruptState(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LearnError>;
