// src/error.rs

//! Error types shared across the crate

use thiserror::Error;

/// Errors produced while evaluating a recipe
#[derive(Debug, Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Version control error: {0}")]
    VersionControl(String),

    #[error("Dependency resolution error: {0}")]
    ResolutionError(String),

    #[error("{phase} phase failed: {detail}")]
    PhaseFailed { phase: String, detail: String },
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
