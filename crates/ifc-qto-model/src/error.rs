// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Errors surfaced by an [`ElementSource`](crate::ElementSource)

use crate::EntityId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Reading a model file or looking something up in it failed
#[derive(Error, Debug)]
pub enum ParseError {
    /// Content is not an ISO-10303-21 file with a usable DATA section
    #[error("Invalid IFC format: {0}")]
    InvalidFormat(String),

    /// No decodable entity with this ID
    #[error("Entity {0} not found")]
    EntityNotFound(EntityId),

    /// Attribute expected to hold a reference holds something else
    #[error("Attribute {attribute} of {entity} is not a reference")]
    InvalidReference { entity: EntityId, attribute: usize },

    /// Attribute required for the lookup is null or absent
    #[error("Entity {entity} has no attribute {attribute}")]
    MissingAttribute { entity: EntityId, attribute: usize },

    /// Body representation could not be measured
    #[error("Cannot measure {entity}: {message}")]
    Geometry { entity: EntityId, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl ParseError {
    pub fn format(msg: impl Into<String>) -> Self {
        ParseError::InvalidFormat(msg.into())
    }

    pub fn geometry(entity: EntityId, msg: impl Into<String>) -> Self {
        ParseError::Geometry {
            entity,
            message: msg.into(),
        }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        ParseError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_entity() {
        assert_eq!(
            ParseError::EntityNotFound(EntityId(42)).to_string(),
            "Entity #42 not found"
        );
        assert_eq!(
            ParseError::geometry(EntityId(7), "no measurable body items").to_string(),
            "Cannot measure #7: no measurable body items"
        );
    }
}
