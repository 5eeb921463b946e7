// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Measured geometry of an element

use crate::Result;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in file units
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    /// Create from corners
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all points, `None` when there are none
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 3]>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first, first);
        for p in iter {
            bbox.include(p);
        }
        Some(bbox)
    }

    /// Grow to contain a point
    pub fn include(&mut self, p: [f64; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    /// Union of two boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        out.include(other.min);
        out.include(other.max);
        out
    }

    /// Extent along x, y and z
    pub fn dimensions(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Longest extent
    pub fn longest_side(&self) -> f64 {
        let [x, y, z] = self.dimensions();
        x.max(y).max(z)
    }
}

/// Measured solid geometry of one element, in file units
///
/// Each measure can fail on its own; callers treat a failure as "unknown"
/// for that measure only.
pub trait ShapeGeometry {
    /// Enclosed volume
    fn volume(&self) -> Result<f64>;

    /// Total surface area
    fn surface_area(&self) -> Result<f64>;

    /// Axis-aligned bounding box
    fn bounding_box(&self) -> Result<BoundingBox>;
}
