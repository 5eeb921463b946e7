// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-QTO Core
//!
//! Quantity take-off over any [`ElementSource`](ifc_qto_model::ElementSource):
//! unit normalization, three-tier quantity resolution, bill of quantities
//! aggregation and unit-rate cost estimation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_qto_core::{run, RunOptions};
//!
//! let document = ifc_qto_parser::open("model.ifc")?;
//! let report = run(&document, &RunOptions::default())?;
//! for line in &report.boq {
//!     println!("{} {} {} {}", line.item_no, line.description, line.quantity, line.unit);
//! }
//! ```

pub mod boq;
pub mod collect;
pub mod config;
pub mod cost;
pub mod error;
pub mod extract;
pub mod lookup;
pub mod pipeline;
pub mod quantity;
pub mod units;

#[cfg(test)]
mod test_support;

pub use boq::{
    describe, number_lines, summarize, BoqAggregator, BoqLine, BoqSummary, GroupKey, UnitOfMeasure,
    NOT_SPECIFIED, UNKNOWN,
};
pub use collect::ElementCollector;
pub use config::{GroupBy, PriorityTable, QtoConfig};
pub use cost::{CostReport, PricedLine, RateTable};
pub use error::{QtoError, Result};
pub use extract::extract_batch;
pub use pipeline::{run, ProjectInfo, QtoReport, RunOptions};
pub use quantity::{
    MeasureSources, PartialQuantities, Provenance, QuantityRecord, QuantityResolver,
};
pub use units::{resolve_unit_scale, unit_scale_of, ScaleSource, UnitScale};
