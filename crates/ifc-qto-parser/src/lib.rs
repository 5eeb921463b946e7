// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-QTO Parser - STEP reader for quantity take-off
//!
//! This crate reads IFC (STEP) files and exposes them to the take-off core
//! through the `ElementSource` trait defined in `ifc-qto-model`.
//!
//! # Features
//!
//! - **Fast tokenization** using `nom` combinators
//! - **SIMD-accelerated scanning** using `memchr`
//! - **Lazy entity decoding** - only parse entities when needed
//! - **Relationship indexes** for property sets, quantity sets, materials
//!   and storey containment, built once per document
//! - **Body measurement** through `ifc-qto-geometry`
//!
//! # Example
//!
//! ```ignore
//! use ifc_qto_model::{ElementSource, IfcType};
//! use ifc_qto_parser::IfcDocument;
//!
//! let document = IfcDocument::open("model.ifc")?;
//! let walls = document.elements_by_type(&IfcType::IfcWall)?;
//! println!("Found {} walls", walls.len());
//! ```

mod materials;
mod model;
mod properties;
mod resolver;
mod scanner;
mod spatial;
mod tokenizer;
mod units;

pub use model::IfcDocument;
pub use resolver::ResolverImpl;
pub use scanner::{parse_header, EntityScanner};
pub use tokenizer::{parse_entity, Token};

use ifc_qto_model::Result;
use std::path::Path;

/// Quick parse function for simple use cases
pub fn parse(content: &str) -> Result<IfcDocument> {
    IfcDocument::parse(content)
}

/// Read and parse an IFC file
pub fn open(path: impl AsRef<Path>) -> Result<IfcDocument> {
    IfcDocument::open(path)
}
