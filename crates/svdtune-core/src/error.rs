//! Error types for svdtune.
//!
//! This module provides a unified error type for all svdtune operations,
//! with specific error variants for different failure modes.

use std::io;

use thiserror::Error;

/// A specialized `Result` type for svdtune operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for svdtune.
#[derive(Error, Debug)]
pub enum Error {
    /// Request never completed or failed at the network level
    #[error("recompression request failed: {0}")]
    Transport(String),

    /// Backend answered with an `error` field
    #[error("backend rejected recompression: {0}")]
    Backend(String),

    /// Backend answered without the fields a result needs
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    /// Selected file type is not accepted for upload
    #[error("unsupported file type '{0}': only png, jpg and jpeg are accepted")]
    UnsupportedFile(String),

    /// Selected file exceeds the upload limit
    #[error("file '{file}' is {size} bytes, limit is {limit} bytes")]
    FileTooLarge {
        /// File name
        file: String,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// File not found
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Image could not be decoded for preview
    #[error("failed to decode '{file}': {reason}")]
    Decode {
        /// File name
        file: String,
        /// Reason for failure
        reason: String,
    },

    /// Control input could not be interpreted
    #[error("invalid control input: {0}")]
    InvalidControl(String),

    /// Configuration file error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Reason for invalidity
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Internal error (should not happen)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns whether retrying the same request could succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns a helpful suggestion for resolving the error, if applicable.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Transport(_) => Some(
                "Check that the compression server is running and that\n\
                 session.base_url in the config points at it.",
            ),
            Self::UnsupportedFile(_) => Some("Convert the image to PNG or JPEG and try again."),
            Self::FileTooLarge { .. } => Some(
                "Resize the image or raise upload.max_file_size in the config\n\
                 (the server may enforce its own limit).",
            ),
            Self::InvalidConfig { .. } | Self::ConfigError(_) => {
                Some("Run 'svdtune config reset' to restore the defaults.")
            }
            _ => None,
        }
    }
}
