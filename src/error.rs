//! Error types for IDE-R command handling

use thiserror::Error;

/// IDE-R target errors
///
/// Protocol-level failures (bad page codes, out-of-range LBAs and the like)
/// are not errors in this sense: they are reported to the remote host as
/// sense data inside a Command-End-Response message. Only failures of the
/// underlying redirection channel surface here.
#[derive(Debug, Error)]
pub enum IderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for IDE-R operations
pub type IderResult<T> = Result<T, IderError>;
