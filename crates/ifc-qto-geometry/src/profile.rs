// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Swept area profiles
//!
//! Profiles are measured analytically: parameterized shapes from their
//! dimensions, arbitrary shapes from their polyline outline. Nothing is
//! tessellated.

use crate::error::{Error, Result};
use crate::placement::{axis2_placement_2d, cartesian_point, transform_point_2d};
use ifc_qto_model::{DecodedEntity, EntityId, EntityResolver, IfcType};
use nalgebra::Point2;
use std::f64::consts::PI;

/// Cross section measures of a profile, in profile coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSection {
    /// Net area, voids subtracted
    pub area: f64,
    /// Length of all boundaries, voids included
    pub perimeter: f64,
    /// Lower corner of the 2D extent
    pub min: Point2<f64>,
    /// Upper corner of the 2D extent
    pub max: Point2<f64>,
}

impl ProfileSection {
    /// Section of a `width` x `depth` shape centred on the origin
    fn centred(area: f64, perimeter: f64, width: f64, depth: f64) -> Self {
        Self {
            area,
            perimeter,
            min: Point2::new(-width / 2.0, -depth / 2.0),
            max: Point2::new(width / 2.0, depth / 2.0),
        }
    }

    /// Section bounded by a closed polygon
    pub fn from_polygon(points: &[Point2<f64>]) -> Result<Self> {
        if points.len() < 3 {
            return Err(Error::profile("Profile must have at least 3 points"));
        }
        let (min, max) = extent(points);
        Ok(Self {
            area: polygon_area(points).abs(),
            perimeter: polygon_perimeter(points),
            min,
            max,
        })
    }

    /// Subtract a void bounded by a closed polygon
    pub fn subtract_void(&mut self, points: &[Point2<f64>]) {
        self.area -= polygon_area(points).abs();
        self.perimeter += polygon_perimeter(points);
    }

    /// The four corners of the extent
    pub fn corners(&self) -> [Point2<f64>; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }
}

/// Signed shoelace area, positive for counter-clockwise outlines
pub fn polygon_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice / 2.0
}

/// Length of a closed outline
pub fn polygon_perimeter(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| nalgebra::distance(&points[i], &points[(i + 1) % n]))
        .sum()
}

fn extent(points: &[Point2<f64>]) -> (Point2<f64>, Point2<f64>) {
    let mut min = points[0];
    let mut max = points[0];
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

/// Measure a profile definition
pub fn extract_profile(
    profile: &DecodedEntity,
    resolver: &dyn EntityResolver,
) -> Result<ProfileSection> {
    let section = match profile.ifc_type {
        IfcType::IfcRectangleProfileDef => rectangle(profile)?,
        IfcType::IfcRectangleHollowProfileDef => rectangle_hollow(profile)?,
        IfcType::IfcCircleProfileDef => circle(profile)?,
        IfcType::IfcCircleHollowProfileDef => circle_hollow(profile)?,
        IfcType::IfcIShapeProfileDef => i_shape(profile)?,
        IfcType::IfcArbitraryClosedProfileDef => return arbitrary(profile, resolver),
        IfcType::IfcArbitraryProfileDefWithVoids => return arbitrary_with_voids(profile, resolver),
        _ => {
            return Err(Error::unsupported(format!(
                "Profile type {}",
                profile.ifc_type
            )))
        }
    };

    // Parameterized profiles carry their own Position at index 2
    match profile
        .get_ref(2)
        .and_then(|id| axis2_placement_2d(id, resolver))
    {
        Some(transform) => {
            let moved: Vec<Point2<f64>> = section
                .corners()
                .iter()
                .map(|p| transform_point_2d(&transform, *p))
                .collect();
            let (min, max) = extent(&moved);
            Ok(ProfileSection { min, max, ..section })
        }
        None => Ok(section),
    }
}

fn positive(entity: &DecodedEntity, index: usize, name: &str) -> Result<f64> {
    match entity.get_float(index) {
        Some(value) if value > 0.0 => Ok(value),
        Some(_) => Err(Error::attribute(index, format!("{} must be positive", name))),
        None => Err(Error::attribute(index, format!("Missing {}", name))),
    }
}

/// IfcRectangleProfileDef: XDim at 3, YDim at 4
fn rectangle(entity: &DecodedEntity) -> Result<ProfileSection> {
    let x = positive(entity, 3, "XDim")?;
    let y = positive(entity, 4, "YDim")?;
    Ok(ProfileSection::centred(x * y, 2.0 * (x + y), x, y))
}

/// IfcRectangleHollowProfileDef: XDim at 3, YDim at 4, WallThickness at 5
fn rectangle_hollow(entity: &DecodedEntity) -> Result<ProfileSection> {
    let x = positive(entity, 3, "XDim")?;
    let y = positive(entity, 4, "YDim")?;
    let t = positive(entity, 5, "WallThickness")?;
    let (ix, iy) = (x - 2.0 * t, y - 2.0 * t);
    if ix <= 0.0 || iy <= 0.0 {
        return Err(Error::profile("Wall thickness closes the hollow rectangle"));
    }
    Ok(ProfileSection::centred(
        x * y - ix * iy,
        2.0 * (x + y) + 2.0 * (ix + iy),
        x,
        y,
    ))
}

/// IfcCircleProfileDef: Radius at 3
fn circle(entity: &DecodedEntity) -> Result<ProfileSection> {
    let radius = positive(entity, 3, "Radius")?;
    Ok(ProfileSection::centred(
        PI * radius * radius,
        2.0 * PI * radius,
        2.0 * radius,
        2.0 * radius,
    ))
}

/// IfcCircleHollowProfileDef: Radius at 3, WallThickness at 4
fn circle_hollow(entity: &DecodedEntity) -> Result<ProfileSection> {
    let radius = positive(entity, 3, "Radius")?;
    let thickness = positive(entity, 4, "WallThickness")?;
    let inner = radius - thickness;
    if inner <= 0.0 {
        return Err(Error::profile("Invalid hollow circle: inner radius <= 0"));
    }
    Ok(ProfileSection::centred(
        PI * (radius * radius - inner * inner),
        2.0 * PI * (radius + inner),
        2.0 * radius,
        2.0 * radius,
    ))
}

/// IfcIShapeProfileDef: OverallWidth(3), OverallDepth(4), WebThickness(5),
/// FlangeThickness(6); fillets are ignored
fn i_shape(entity: &DecodedEntity) -> Result<ProfileSection> {
    let width = positive(entity, 3, "OverallWidth")?;
    let depth = positive(entity, 4, "OverallDepth")?;
    let web = positive(entity, 5, "WebThickness")?;
    let flange = positive(entity, 6, "FlangeThickness")?;

    let hw = width / 2.0;
    let hd = depth / 2.0;
    let hwt = web / 2.0;
    let points = [
        Point2::new(-hw, -hd),
        Point2::new(hw, -hd),
        Point2::new(hw, -hd + flange),
        Point2::new(hwt, -hd + flange),
        Point2::new(hwt, hd - flange),
        Point2::new(hw, hd - flange),
        Point2::new(hw, hd),
        Point2::new(-hw, hd),
        Point2::new(-hw, hd - flange),
        Point2::new(-hwt, hd - flange),
        Point2::new(-hwt, -hd + flange),
        Point2::new(-hw, -hd + flange),
    ];
    ProfileSection::from_polygon(&points)
}

/// IfcArbitraryClosedProfileDef: OuterCurve at 2
fn arbitrary(entity: &DecodedEntity, resolver: &dyn EntityResolver) -> Result<ProfileSection> {
    let curve_id = entity
        .get_ref(2)
        .ok_or_else(|| Error::attribute(2, "Missing OuterCurve"))?;
    ProfileSection::from_polygon(&polyline_points(curve_id, resolver)?)
}

/// IfcArbitraryProfileDefWithVoids: OuterCurve at 2, InnerCurves at 3
fn arbitrary_with_voids(
    entity: &DecodedEntity,
    resolver: &dyn EntityResolver,
) -> Result<ProfileSection> {
    let mut section = arbitrary(entity, resolver)?;
    for curve_id in entity.get_refs(3).unwrap_or_default() {
        match polyline_points(curve_id, resolver) {
            Ok(points) if points.len() >= 3 => section.subtract_void(&points),
            Ok(_) => log::debug!("Skipping degenerate void {}", curve_id),
            Err(e) => log::debug!("Skipping void {}: {}", curve_id, e),
        }
    }
    Ok(section)
}

/// IfcPolyline(Points) as a closed outline without the repeated end point
fn polyline_points(curve_id: EntityId, resolver: &dyn EntityResolver) -> Result<Vec<Point2<f64>>> {
    let curve = resolver
        .get(curve_id)
        .ok_or_else(|| Error::missing(curve_id))?;

    if curve.ifc_type != IfcType::IfcPolyline {
        return Err(Error::unsupported(format!(
            "Curve type {}",
            curve.ifc_type
        )));
    }

    let mut points: Vec<Point2<f64>> = curve
        .get_refs(0)
        .ok_or_else(|| Error::attribute(0, "Missing Points"))?
        .into_iter()
        .filter_map(|id| cartesian_point(id, resolver))
        .map(|p| Point2::new(p.x, p.y))
        .collect();

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        if points.len() > 1 && nalgebra::distance(first, last) < 1e-10 {
            points.pop();
        }
    }

    Ok(points)
}
