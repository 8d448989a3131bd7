//! Error types for the commutator benchmark.

use thiserror::Error;

/// Errors that can occur while preparing, running or checking a kernel.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid benchmark configuration (run counts, extents, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A buffer does not have the shape or layout an operation expects.
    #[error("Shape mismatch: {0}")]
    Shape(String),

    /// A compile-time-constant kernel was asked for extents it was not
    /// instantiated with.
    #[error("No constant-extent instantiation for dim={dim}, vec_len={vec_len}")]
    UnsupportedExtents {
        /// Requested matrix dimension.
        dim: usize,
        /// Requested vector length.
        vec_len: usize,
    },

    /// Runtime kernel compilation failed.
    #[error("Build of kernel '{kernel}' failed:\n{log}")]
    Build {
        /// Entry point or program being built.
        kernel: String,
        /// Compiler output.
        log: String,
    },

    /// A device operation (transfer, launch, wait) failed.
    #[error("Device operation '{operation}' failed: {message}")]
    Device {
        /// Identity of the failing operation.
        operation: String,
        /// Backend-provided description.
        message: String,
    },

    /// Writing the results stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for benchmark operations.
pub type Result<T> = std::result::Result<T, Error>;
