//! Error types for OpenCL operations.

use thiserror::Error;

/// Errors that can occur while talking to an OpenCL device.
#[derive(Debug, Error)]
pub enum OpenClError {
    /// No platform or no device of the requested type.
    #[error("No OpenCL device available: {0}")]
    NoDevice(String),

    /// An OpenCL API call failed.
    #[error("OpenCL {operation} failed: {message}")]
    Api {
        /// Failing operation, e.g. `enqueue_write_buffer(sigma_in)`.
        operation: String,
        /// Driver-provided description.
        message: String,
    },

    /// Program compilation failed.
    #[error("Build of '{kernel}' failed:\n{log}")]
    Build {
        /// Entry point the program was built for.
        kernel: String,
        /// Compiler output.
        log: String,
    },

    /// Requested launch does not fit the problem size.
    #[error("Invalid launch configuration: {0}")]
    Launch(String),

    /// The global context lock was poisoned by a panicking initialiser.
    #[error("OpenCL context initialisation panicked")]
    Poisoned,
}

impl OpenClError {
    /// Wrap a driver error for `operation`.
    pub fn api(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Api {
            operation: operation.into(),
            message: err.to_string(),
        }
    }
}

impl From<OpenClError> for commutator_bench::Error {
    fn from(err: OpenClError) -> Self {
        match err {
            OpenClError::Build { kernel, log } => commutator_bench::Error::Build { kernel, log },
            OpenClError::Api { operation, message } => {
                commutator_bench::Error::Device { operation, message }
            }
            OpenClError::Launch(msg) => commutator_bench::Error::Config(msg),
            other => commutator_bench::Error::Device {
                operation: "context".to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Result type for OpenCL operations.
pub type Result<T> = std::result::Result<T, OpenClError>;
