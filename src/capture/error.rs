//! Error types for geometry acquisition.

use thiserror::Error;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};

#[derive(Error, Debug)]
pub enum CaptureError {
    /// A query primitive could not be invoked at all.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// Output was received but did not have the expected structure.
    #[error("unparsable output: {0}")]
    UnparsableOutput(String),

    #[error("pointer grab denied: {0}")]
    GrabDenied(String),

    #[error("display error: {0}")]
    Display(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CaptureError>;

impl From<ConnectError> for CaptureError {
    fn from(e: ConnectError) -> Self {
        CaptureError::Display(format!("cannot connect to X server: {}", e))
    }
}

impl From<ConnectionError> for CaptureError {
    fn from(e: ConnectionError) -> Self {
        CaptureError::Display(e.to_string())
    }
}

impl From<ReplyError> for CaptureError {
    fn from(e: ReplyError) -> Self {
        CaptureError::Display(e.to_string())
    }
}

impl From<ReplyOrIdError> for CaptureError {
    fn from(e: ReplyOrIdError) -> Self {
        CaptureError::Display(e.to_string())
    }
}
