// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the take-off pipeline

use ifc_qto_model::{EntityId, ParseError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for take-off operations
pub type Result<T> = std::result::Result<T, QtoError>;

/// Take-off errors
#[derive(Error, Debug)]
pub enum QtoError {
    /// Element cannot be processed at all
    #[error("Invalid element {id}: {reason}")]
    InvalidElement { id: EntityId, reason: String },

    /// Error raised by the element source
    #[error("Source error: {0}")]
    Source(#[from] ParseError),

    /// Rate file exists but cannot be read
    #[error("Cannot read rate file {}: {source}", path.display())]
    RateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration file or value
    #[error("Invalid configuration {path}: {message}")]
    Config { path: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QtoError {
    /// Create an invalid element error
    pub fn invalid_element(id: EntityId, reason: impl Into<String>) -> Self {
        QtoError::InvalidElement {
            id,
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        QtoError::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}
