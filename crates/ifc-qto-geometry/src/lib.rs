// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-QTO Geometry Measurement
//!
//! Volume, surface area and bounding box of IFC body representations, used
//! as the last-resort quantity source when an element carries no quantity
//! data. This crate uses the `EntityResolver` trait from `ifc-qto-model` for
//! entity lookup, making it independent of any specific parser.
//!
//! ## Overview
//!
//! - **Profiles**: analytic area and perimeter of rectangle, circle, hollow,
//!   I-shape and polyline profiles
//! - **Extrusion**: prism measures of `IfcExtrudedAreaSolid`
//! - **Boundary representations**: divergence-theorem volume of
//!   `IfcTriangulatedFaceSet` and `IfcFacetedBrep`
//! - **Composition**: mapped items expand, boolean results measure their
//!   first operand
//!
//! All values are in file units; scaling to metres is the caller's concern.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_qto_geometry::GeometryRouter;
//! use ifc_qto_model::ShapeGeometry;
//!
//! let router = GeometryRouter::with_default_processors();
//! if let Some(shape) = router.measure_product(&wall, &resolver)? {
//!     println!("volume: {:?}", shape.volume());
//! }
//! ```

pub mod error;
pub mod mesh;
pub mod placement;
pub mod processors;
pub mod profile;
pub mod router;
pub mod shape;

#[cfg(test)]
mod test_support;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use error::{Error, Result};
pub use mesh::{Face, FaceSet};
pub use profile::{extract_profile, ProfileSection};
pub use router::{GeometryProcessor, GeometryRouter};
pub use shape::{ElementShape, SolidMeasure};

pub use processors::{
    ExtrudedAreaSolidProcessor, FacetedBrepProcessor, TriangulatedFaceSetProcessor,
};
