//! Error types shared by the injectors and the launcher.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by a [`crate::store::ParameterStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A session with the parameter store could not be established.
    #[error("failed to create a parameter store session: {0}")]
    Session(String),
    /// No region in the environment, shared config, or instance metadata.
    #[error("could not find region configurations")]
    RegionNotFound,
    /// A single remote request failed.
    #[error("ssm:{operation} failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    /// Session-level failures leave no way to reach the store at all.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, StoreError::Request { .. })
    }
}

/// Errors that stop the wrapper before the wrapped command is launched.
#[derive(Debug, Error)]
pub enum InjectorError {
    #[error("no command specified")]
    MissingCommand,

    #[error(transparent)]
    Session(StoreError),

    #[error("ssm:GetParametersByPath failed (path: {path})")]
    PathListing {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to load env file '{}'", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to exec '{program}'")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
