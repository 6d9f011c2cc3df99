//! Error types for costar-engine

use crate::provider::ProviderError;
use thiserror::Error;

/// Engine error type
#[derive(Debug, Error)]
pub enum EngineError {
    /// costar-common error (storage, serialization, config)
    #[error(transparent)]
    Common(#[from] costar_common::Error),

    /// Metadata provider error
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Invalid argument to an engine operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
