//! Error types for arbor_runtime

use crate::root::RootId;
use arbor_reconciler::ReconcileError;
use thiserror::Error;

/// Errors raised by render sessions
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The operation is not valid in the session's current state
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// The root handle is stale
    #[error("unknown root {0:?}")]
    UnknownRoot(RootId),

    /// Failed to parse configuration
    #[error("config parsing failed: {0}")]
    Config(#[from] toml::de::Error),

    /// Failed to read a configuration file
    #[error("config read failed: {0}")]
    Io(#[from] std::io::Error),

    /// Reconciliation failed
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// Result type for arbor_runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
