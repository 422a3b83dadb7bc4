//! Error types for the typed emitter.

use thiserror::Error;

/// Errors from listener registration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmitterError {
    /// The namespace string was empty.
    #[error("Namespace should be a non-empty string")]
    InvalidNamespace,
}

/// Errors from reading emitter configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The failure policy name was not recognised.
    #[error("Unknown failure policy: {0} (expected isolate or propagate)")]
    UnknownFailurePolicy(String),
}

/// Result alias for emitter operations.
pub type Result<T> = std::result::Result<T, EmitterError>;
