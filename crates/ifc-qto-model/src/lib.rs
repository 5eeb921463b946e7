// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-QTO Model - shared types and collaborator traits for quantity take-off
//!
//! This crate holds the vocabulary every other crate of the workspace speaks:
//! entity identifiers and decoded STEP attributes, property and quantity sets,
//! unit descriptors and the traits that separate the take-off core from the
//! document that feeds it.
//!
//! # Architecture
//!
//! - [`EntityResolver`] - entity lookup and reference resolution inside a STEP file
//! - [`ElementSource`] - what the take-off core needs from a building model
//! - [`ShapeGeometry`] - measured solid geometry of one element
//!
//! # Example
//!
//! ```ignore
//! use ifc_qto_model::{ElementSource, IfcType};
//!
//! fn count_walls(source: &dyn ElementSource) -> ifc_qto_model::Result<usize> {
//!     Ok(source.elements_by_type(&IfcType::IfcWall)?.len())
//! }
//! ```

pub mod error;
pub mod geometry;
pub mod properties;
pub mod resolver;
pub mod traits;
pub mod types;
pub mod units;

pub use error::*;
pub use geometry::*;
pub use properties::*;
pub use resolver::*;
pub use traits::*;
pub use types::*;
pub use units::*;
