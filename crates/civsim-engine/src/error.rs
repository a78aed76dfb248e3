//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup, the turn loop and
//! snapshot output so `main` can propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: civsim_core::ConfigError,
    },

    /// The director could not be assembled.
    #[error("director error: {source}")]
    Director {
        /// The underlying director error.
        #[from]
        source: civsim_core::DirectorError,
    },

    /// The final snapshot could not be produced.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying persistence error.
        #[from]
        source: civsim_core::PersistError,
    },

    /// Writing the snapshot file failed.
    #[error("failed to write snapshot to {}: {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
