//! Error type.

use std::{io, path::PathBuf};
use thiserror::Error;

/// rpigpio error.
#[derive(Debug, Error)]
pub enum Error {
    /// The register space could not be provided.
    #[error("register space at {} is unavailable", path.display())]
    ResourceUnavailable {
        /// Device or image file.
        path: PathBuf,
        /// Cause.
        #[source]
        source: io::Error,
    },
    /// An endpoint of the same name exists.
    #[error("endpoint {0} is already registered")]
    AlreadyRegistered(String),
    /// No endpoint of that name exists.
    #[error("endpoint {0} is not registered")]
    NotRegistered(String),
    /// Writing the report failed.
    #[error("cannot write report")]
    Io(#[from] io::Error),
}

/// rpigpio result.
pub type Result<T> = std::result::Result<T, Error>;
