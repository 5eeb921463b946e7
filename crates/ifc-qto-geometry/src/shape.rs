// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Measured shapes

use ifc_qto_model::{BoundingBox, EntityId, ParseError, ShapeGeometry};

/// Measures of one representation item, in file units
#[derive(Debug, Clone, PartialEq)]
pub struct SolidMeasure {
    /// `None` when the item does not bound a volume
    pub volume: Option<f64>,
    pub surface_area: f64,
    pub bounding_box: BoundingBox,
}

/// Body geometry of a product, as the sum of its representation items
#[derive(Debug, Clone)]
pub struct ElementShape {
    product: EntityId,
    items: Vec<SolidMeasure>,
}

impl ElementShape {
    pub fn new(product: EntityId, items: Vec<SolidMeasure>) -> Self {
        Self { product, items }
    }

    /// Product the shape belongs to
    pub fn product(&self) -> EntityId {
        self.product
    }

    /// Measured items
    pub fn items(&self) -> &[SolidMeasure] {
        &self.items
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError::geometry(self.product, message)
    }
}

impl ShapeGeometry for ElementShape {
    fn volume(&self) -> ifc_qto_model::Result<f64> {
        if self.items.is_empty() {
            return Err(self.error("no measurable body items"));
        }
        self.items
            .iter()
            .map(|item| item.volume)
            .sum::<Option<f64>>()
            .ok_or_else(|| self.error("body contains open surfaces"))
    }

    fn surface_area(&self) -> ifc_qto_model::Result<f64> {
        if self.items.is_empty() {
            return Err(self.error("no measurable body items"));
        }
        Ok(self.items.iter().map(|item| item.surface_area).sum())
    }

    fn bounding_box(&self) -> ifc_qto_model::Result<BoundingBox> {
        self.items
            .iter()
            .map(|item| item.bounding_box)
            .reduce(|a, b| a.union(&b))
            .ok_or_else(|| self.error("no measurable body items"))
    }
}
