// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary representation measures
//!
//! A closed boundary is a set of planar faces, each bounded by one or more
//! loops. Volume follows from the divergence theorem and needs consistently
//! oriented faces; area is the sum of the face vector areas.

use crate::error::{Error, Result};
use ifc_qto_model::BoundingBox;
use nalgebra::{Point3, Vector3};

/// A planar face with its outer loop and any inner loops
#[derive(Debug, Clone, Default)]
pub struct Face {
    pub loops: Vec<Vec<Point3<f64>>>,
}

impl Face {
    /// Face with a single loop
    pub fn new(outer: Vec<Point3<f64>>) -> Self {
        Self { loops: vec![outer] }
    }

    /// Net vector area; inner loops wound against the outer one cancel out
    pub fn vector_area(&self) -> Vector3<f64> {
        self.loops.iter().map(|l| loop_vector_area(l)).sum()
    }
}

/// Vector area of a closed loop
fn loop_vector_area(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    if n < 3 {
        return Vector3::zeros();
    }
    let mut sum = Vector3::zeros();
    for i in 0..n {
        sum += points[i].coords.cross(&points[(i + 1) % n].coords);
    }
    sum / 2.0
}

/// Faces of one boundary representation
#[derive(Debug, Clone, Default)]
pub struct FaceSet {
    pub faces: Vec<Face>,
    /// Whether the faces bound a volume
    pub closed: bool,
}

impl FaceSet {
    pub fn new(faces: Vec<Face>, closed: bool) -> Self {
        Self { faces, closed }
    }

    /// Enclosed volume, `None` for open shells
    pub fn volume(&self) -> Option<f64> {
        if !self.closed {
            return None;
        }
        let six_v: f64 = self
            .faces
            .iter()
            .filter_map(|face| {
                let anchor = face.loops.first()?.first()?;
                Some(anchor.coords.dot(&face.vector_area()))
            })
            .sum();
        Some((six_v / 3.0).abs())
    }

    /// Total face area
    pub fn surface_area(&self) -> f64 {
        self.faces.iter().map(|f| f.vector_area().norm()).sum()
    }

    /// Extent of all loop points
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        let points = self
            .faces
            .iter()
            .flat_map(|f| f.loops.iter().flatten())
            .map(|p| [p.x, p.y, p.z]);
        BoundingBox::from_points(points).ok_or_else(|| Error::degenerate("Face set has no points"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Axis-aligned box as six outward facing quads
    fn cuboid(x: f64, y: f64, z: f64) -> FaceSet {
        let p = |a: f64, b: f64, c: f64| Point3::new(a, b, c);
        let faces = vec![
            Face::new(vec![p(0., 0., 0.), p(0., y, 0.), p(x, y, 0.), p(x, 0., 0.)]),
            Face::new(vec![p(0., 0., z), p(x, 0., z), p(x, y, z), p(0., y, z)]),
            Face::new(vec![p(0., 0., 0.), p(x, 0., 0.), p(x, 0., z), p(0., 0., z)]),
            Face::new(vec![p(0., y, 0.), p(0., y, z), p(x, y, z), p(x, y, 0.)]),
            Face::new(vec![p(0., 0., 0.), p(0., 0., z), p(0., y, z), p(0., y, 0.)]),
            Face::new(vec![p(x, 0., 0.), p(x, y, 0.), p(x, y, z), p(x, 0., z)]),
        ];
        FaceSet::new(faces, true)
    }

    #[test]
    fn test_cuboid_measures() {
        let solid = cuboid(2.0, 3.0, 4.0);
        assert_relative_eq!(solid.volume().unwrap(), 24.0, epsilon = 1e-9);
        assert_relative_eq!(solid.surface_area(), 52.0, epsilon = 1e-9);
        assert_eq!(solid.bounding_box().unwrap().max, [2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_face_with_hole() {
        let p = |a: f64, b: f64| Point3::new(a, b, 0.0);
        let face = Face {
            loops: vec![
                vec![p(0., 0.), p(4., 0.), p(4., 4.), p(0., 4.)],
                vec![p(1., 1.), p(1., 2.), p(2., 2.), p(2., 1.)],
            ],
        };
        assert_relative_eq!(face.vector_area().norm(), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_open_shell_has_no_volume() {
        let mut solid = cuboid(1.0, 1.0, 1.0);
        solid.closed = false;
        assert!(solid.volume().is_none());
        assert!(FaceSet::default().bounding_box().is_err());
    }
}
