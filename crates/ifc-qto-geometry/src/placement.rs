// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Points, directions and axis placements

use ifc_qto_model::{AttributeValue, EntityId, EntityResolver, IfcType};
use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector2, Vector3};

/// Coordinates of a list value, missing components read as zero
pub fn coordinates(list: &[AttributeValue]) -> Point3<f64> {
    let at = |i: usize| list.get(i).and_then(|v| v.as_float()).unwrap_or(0.0);
    Point3::new(at(0), at(1), at(2))
}

/// IfcCartesianPoint(Coordinates)
pub fn cartesian_point(point_id: EntityId, resolver: &dyn EntityResolver) -> Option<Point3<f64>> {
    let point = resolver.get(point_id)?;
    if point.ifc_type != IfcType::IfcCartesianPoint {
        return None;
    }
    Some(coordinates(point.get_list(0)?))
}

/// IfcDirection(DirectionRatios), normalized
pub fn direction(dir_id: EntityId, resolver: &dyn EntityResolver) -> Option<Vector3<f64>> {
    let direction = resolver.get(dir_id)?;
    if direction.ifc_type != IfcType::IfcDirection {
        return None;
    }
    let ratios = direction.get_list(0)?;
    let at = |i: usize| ratios.get(i).and_then(|v| v.as_float()).unwrap_or(0.0);
    Vector3::new(at(0), at(1), at(2)).try_normalize(1e-12)
}

/// IfcAxis2Placement3D(Location, Axis, RefDirection) as a rigid transform
pub fn axis2_placement_3d(
    placement_id: EntityId,
    resolver: &dyn EntityResolver,
) -> Option<Matrix4<f64>> {
    let placement = resolver.get(placement_id)?;
    if placement.ifc_type != IfcType::IfcAxis2Placement3D {
        return None;
    }

    let location = cartesian_point(placement.get_ref(0)?, resolver)?;
    let z = placement
        .get_ref(1)
        .and_then(|id| direction(id, resolver))
        .unwrap_or_else(Vector3::z);
    let ref_dir = placement
        .get_ref(2)
        .and_then(|id| direction(id, resolver))
        .unwrap_or_else(Vector3::x);

    // Gram-Schmidt against the axis; a RefDirection parallel to it falls back
    let x = (ref_dir - z * ref_dir.dot(&z))
        .try_normalize(1e-12)
        .or_else(|| (Vector3::x() - z * z.x).try_normalize(1e-12))
        .unwrap_or_else(Vector3::y);
    let y = z.cross(&x);

    Some(Matrix4::new(
        x.x, y.x, z.x, location.x, x.y, y.y, z.y, location.y, x.z, y.z, z.z, location.z, 0.0, 0.0,
        0.0, 1.0,
    ))
}

/// IfcAxis2Placement2D(Location, RefDirection) as a homogeneous 2D transform
pub fn axis2_placement_2d(
    placement_id: EntityId,
    resolver: &dyn EntityResolver,
) -> Option<Matrix3<f64>> {
    let placement = resolver.get(placement_id)?;
    if placement.ifc_type != IfcType::IfcAxis2Placement2D {
        return None;
    }

    let location = cartesian_point(placement.get_ref(0)?, resolver)?;
    let x = placement
        .get_ref(1)
        .and_then(|id| direction(id, resolver))
        .and_then(|d| Vector2::new(d.x, d.y).try_normalize(1e-12))
        .unwrap_or_else(Vector2::x);

    Some(Matrix3::new(
        x.x, -x.y, location.x, x.y, x.x, location.y, 0.0, 0.0, 1.0,
    ))
}

/// Apply a homogeneous 2D transform to a point
pub fn transform_point_2d(transform: &Matrix3<f64>, p: Point2<f64>) -> Point2<f64> {
    transform.transform_point(&p)
}
