//! Controlled process exits.

use thiserror::Error;

/// Error carrier for workflows that must terminate with a specific status
/// code. `main` downcasts anyhow errors to this and honors the code; every
/// other error exits 1.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Exit {
    pub code: i32,
    pub message: String,
}

impl Exit {
    /// Exit with a message on stderr.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Exit silently; everything relevant has already been printed.
    pub fn code(code: i32) -> Self {
        Self {
            code,
            message: String::new(),
        }
    }
}
