// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for shape measurement

use ifc_qto_model::EntityId;
use thiserror::Error;

/// Shape measurement result type
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons an item could not be measured
#[derive(Error, Debug)]
pub enum Error {
    /// Item decoded but its geometry has no measurable extent
    #[error("Degenerate geometry: {0}")]
    Degenerate(String),

    /// Reference to an entity that is absent or undecodable
    #[error("Referenced entity {0} is missing")]
    MissingEntity(EntityId),

    /// Attribute absent or out of range
    #[error("Attribute {index}: {message}")]
    Attribute { index: usize, message: String },

    /// Profile definition that cannot be reduced to an area and perimeter
    #[error("Cannot measure profile: {0}")]
    Profile(String),

    /// Representation item or curve without a processor
    #[error("No measurement for {0}")]
    Unsupported(String),
}

impl Error {
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::Degenerate(msg.into())
    }

    pub fn profile(msg: impl Into<String>) -> Self {
        Error::Profile(msg.into())
    }

    pub fn missing(id: EntityId) -> Self {
        Error::MissingEntity(id)
    }

    pub fn attribute(index: usize, msg: impl Into<String>) -> Self {
        Error::Attribute {
            index,
            message: msg.into(),
        }
    }

    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Error::Unsupported(type_name.into())
    }
}
