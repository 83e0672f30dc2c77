//! Crate error types

use crate::hub::HubError;
use crate::source::SourceError;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
///
/// Transport failures are per-connection concerns handled where they occur;
/// only failures that end an operation the caller asked for surface here.
#[derive(Debug)]
pub enum Error {
    /// Socket-level failure (bind, accept)
    Io(std::io::Error),
    /// Hub refused an operation
    Hub(HubError),
    /// Snapshot source failure
    Source(SourceError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Hub(e) => write!(f, "hub error: {}", e),
            Error::Source(e) => write!(f, "source error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<HubError> for Error {
    fn from(e: HubError) -> Self {
        Error::Hub(e)
    }
}

impl From<SourceError> for Error {
    fn from(e: SourceError) -> Self {
        Error::Source(e)
    }
}
