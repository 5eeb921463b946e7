// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Measurement processors for solid representation items

use crate::error::{Error, Result};
use crate::mesh::{Face, FaceSet};
use crate::placement::{axis2_placement_3d, cartesian_point, coordinates, direction};
use crate::profile::extract_profile;
use crate::router::GeometryProcessor;
use crate::shape::SolidMeasure;
use ifc_qto_model::{BoundingBox, DecodedEntity, EntityResolver, IfcType};
use nalgebra::{Point3, Vector3};

/// IfcExtrudedAreaSolid processor
///
/// Measures the prism swept by the profile: the caps contribute twice the
/// profile area and the sides the perimeter times the depth. For oblique
/// extrusions the side area is measured along the extrusion length.
pub struct ExtrudedAreaSolidProcessor;

impl ExtrudedAreaSolidProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExtrudedAreaSolidProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryProcessor for ExtrudedAreaSolidProcessor {
    fn process(&self, entity: &DecodedEntity, resolver: &dyn EntityResolver) -> Result<SolidMeasure> {
        // IfcExtrudedAreaSolid attributes:
        // 0: SweptArea (IfcProfileDef)
        // 1: Position (IfcAxis2Placement3D)
        // 2: ExtrudedDirection (IfcDirection)
        // 3: Depth (IfcPositiveLengthMeasure)
        let profile_id = entity
            .get_ref(0)
            .ok_or_else(|| Error::attribute(0, "Missing SweptArea"))?;
        let profile_entity = resolver
            .get(profile_id)
            .ok_or_else(|| Error::missing(profile_id))?;
        let profile = extract_profile(&profile_entity, resolver)?;

        let extrusion = entity
            .get_ref(2)
            .and_then(|id| direction(id, resolver))
            .unwrap_or_else(Vector3::z);

        let depth = match entity.get_float(3) {
            Some(depth) if depth > 0.0 => depth,
            Some(_) => return Err(Error::attribute(3, "Depth must be positive")),
            None => return Err(Error::attribute(3, "Missing Depth")),
        };

        let volume = profile.area * depth * extrusion.z.abs();
        let surface_area = 2.0 * profile.area + profile.perimeter * depth;

        let offset = extrusion * depth;
        let local = profile.corners().into_iter().flat_map(|c| {
            let base = Point3::new(c.x, c.y, 0.0);
            [base, base + offset]
        });
        let placed: Vec<Point3<f64>> = match entity
            .get_ref(1)
            .and_then(|id| axis2_placement_3d(id, resolver))
        {
            Some(transform) => local.map(|p| transform.transform_point(&p)).collect(),
            None => local.collect(),
        };
        let bounding_box = BoundingBox::from_points(placed.iter().map(|p| [p.x, p.y, p.z]))
            .ok_or_else(|| Error::degenerate("Extrusion has no extent"))?;

        Ok(SolidMeasure {
            volume: Some(volume),
            surface_area,
            bounding_box,
        })
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcExtrudedAreaSolid]
    }
}

/// IfcTriangulatedFaceSet processor
///
/// Handles explicit triangle meshes (IFC4+).
pub struct TriangulatedFaceSetProcessor;

impl TriangulatedFaceSetProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TriangulatedFaceSetProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryProcessor for TriangulatedFaceSetProcessor {
    fn process(&self, entity: &DecodedEntity, resolver: &dyn EntityResolver) -> Result<SolidMeasure> {
        // IfcTriangulatedFaceSet: Coordinates(0), Normals(1), Closed(2), CoordIndex(3)
        let coords_id = entity
            .get_ref(0)
            .ok_or_else(|| Error::attribute(0, "Missing Coordinates"))?;
        let point_list = resolver
            .get(coords_id)
            .ok_or_else(|| Error::missing(coords_id))?;

        // IfcCartesianPointList3D: CoordList at 0
        let points: Vec<Point3<f64>> = point_list
            .get_list(0)
            .ok_or_else(|| Error::attribute(0, "Missing CoordList"))?
            .iter()
            .filter_map(|coord| coord.as_list().map(coordinates))
            .collect();

        let triangles = entity
            .get_list(3)
            .ok_or_else(|| Error::attribute(3, "Missing CoordIndex"))?;

        let mut faces = Vec::with_capacity(triangles.len());
        for triangle in triangles {
            let corners = triangle
                .as_list()
                .ok_or_else(|| Error::attribute(3, "CoordIndex entry is not a list"))?;
            let face: Option<Vec<Point3<f64>>> = corners
                .iter()
                .map(|index| {
                    // 1-based into CoordList
                    let i = index.as_integer()?;
                    usize::try_from(i - 1).ok().and_then(|i| points.get(i)).copied()
                })
                .collect();
            match face {
                Some(face) if face.len() == 3 => faces.push(Face::new(face)),
                _ => return Err(Error::degenerate("Triangle index out of range")),
            }
        }

        // An unset Closed flag is taken as closed
        let closed = entity.get_bool(2).unwrap_or(true);
        measure_face_set(FaceSet::new(faces, closed))
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcTriangulatedFaceSet]
    }
}

/// IfcFacetedBrep processor
///
/// Walks Outer shell -> faces -> bounds -> poly loops.
pub struct FacetedBrepProcessor;

impl FacetedBrepProcessor {
    pub fn new() -> Self {
        Self
    }

    /// IfcFace(Bounds) with IfcFaceBound / IfcFaceOuterBound(Bound, Orientation)
    fn extract_face(&self, face: &DecodedEntity, resolver: &dyn EntityResolver) -> Option<Face> {
        let mut loops = Vec::new();
        for bound_id in face.get_refs(0)? {
            let Some(bound) = resolver.get(bound_id) else {
                continue;
            };
            let Some(poly_loop) = bound.get_ref(0).and_then(|id| resolver.get(id)) else {
                continue;
            };
            if poly_loop.ifc_type != IfcType::IfcPolyLoop {
                log::debug!("Skipping non-polygonal loop {}", poly_loop.id);
                continue;
            }

            // IfcPolyLoop: Polygon at 0
            let mut points: Vec<Point3<f64>> = poly_loop
                .get_refs(0)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|id| cartesian_point(id, resolver))
                .collect();
            if points.len() < 3 {
                continue;
            }
            if bound.get_bool(1) == Some(false) {
                points.reverse();
            }
            loops.push(points);
        }
        (!loops.is_empty()).then_some(Face { loops })
    }
}

impl Default for FacetedBrepProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryProcessor for FacetedBrepProcessor {
    fn process(&self, entity: &DecodedEntity, resolver: &dyn EntityResolver) -> Result<SolidMeasure> {
        // IfcFacetedBrep: Outer at 0 -> IfcClosedShell: CfsFaces at 0
        let shell_id = entity
            .get_ref(0)
            .ok_or_else(|| Error::attribute(0, "Missing Outer"))?;
        let shell = resolver
            .get(shell_id)
            .ok_or_else(|| Error::missing(shell_id))?;

        let faces: Vec<Face> = shell
            .get_refs(0)
            .ok_or_else(|| Error::attribute(0, "Missing CfsFaces"))?
            .into_iter()
            .filter_map(|id| resolver.get(id))
            .filter_map(|face| self.extract_face(&face, resolver))
            .collect();

        measure_face_set(FaceSet::new(faces, true))
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcFacetedBrep]
    }
}

fn measure_face_set(set: FaceSet) -> Result<SolidMeasure> {
    if set.faces.is_empty() {
        return Err(Error::degenerate("Face set has no faces"));
    }
    Ok(SolidMeasure {
        volume: set.volume(),
        surface_area: set.surface_area(),
        bounding_box: set.bounding_box()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use approx::assert_relative_eq;
    use ifc_qto_model::{AttributeValue, EntityId};

    fn process(
        processor: &dyn GeometryProcessor,
        entities: Vec<DecodedEntity>,
        id: u32,
    ) -> Result<SolidMeasure> {
        let resolver = MapResolver::new(entities);
        let item = resolver.get(EntityId(id)).unwrap();
        processor.process(&item, &resolver)
    }

    fn slab_entities(direction: &[f64], position: AttributeValue) -> Vec<DecodedEntity> {
        vec![
            entity(
                1,
                IfcType::IfcRectangleProfileDef,
                vec![e("AREA"), null(), null(), f(2.0), f(3.0)],
            ),
            dir(2, direction),
            point(3, &[10.0, 0.0, 5.0]),
            entity(4, IfcType::IfcAxis2Placement3D, vec![r(3), null(), null()]),
            entity(5, IfcType::IfcExtrudedAreaSolid, vec![r(1), position, r(2), f(0.5)]),
        ]
    }

    #[test]
    fn test_rectangle_extrusion() {
        let measure = process(
            &ExtrudedAreaSolidProcessor::new(),
            slab_entities(&[0.0, 0.0, 1.0], r(4)),
            5,
        )
        .unwrap();
        assert_relative_eq!(measure.volume.unwrap(), 3.0);
        assert_relative_eq!(measure.surface_area, 2.0 * 6.0 + 10.0 * 0.5);
        assert_eq!(measure.bounding_box.min, [9.0, -1.5, 5.0]);
        assert_eq!(measure.bounding_box.max, [11.0, 1.5, 5.5]);
    }

    #[test]
    fn test_oblique_extrusion_volume() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let measure = process(
            &ExtrudedAreaSolidProcessor::new(),
            slab_entities(&[s, 0.0, s], null()),
            5,
        )
        .unwrap();
        assert_relative_eq!(measure.volume.unwrap(), 6.0 * 0.5 * s, epsilon = 1e-12);
    }

    #[test]
    fn test_extrusion_without_depth_fails() {
        let mut entities = slab_entities(&[0.0, 0.0, 1.0], null());
        entities[4] = entity(5, IfcType::IfcExtrudedAreaSolid, vec![r(1), null(), r(2), null()]);
        assert!(process(&ExtrudedAreaSolidProcessor::new(), entities, 5).is_err());
    }

    /// Unit tetrahedron with outward winding
    fn tetrahedron(closed: AttributeValue) -> Vec<DecodedEntity> {
        let coords = AttributeValue::List(vec![
            floats(&[0.0, 0.0, 0.0]),
            floats(&[1.0, 0.0, 0.0]),
            floats(&[0.0, 1.0, 0.0]),
            floats(&[0.0, 0.0, 1.0]),
        ]);
        let tri = |a: i64, b: i64, c: i64| {
            AttributeValue::List(vec![
                AttributeValue::Integer(a),
                AttributeValue::Integer(b),
                AttributeValue::Integer(c),
            ])
        };
        vec![
            entity(1, IfcType::IfcCartesianPointList3D, vec![coords]),
            entity(
                2,
                IfcType::IfcTriangulatedFaceSet,
                vec![
                    r(1),
                    null(),
                    closed,
                    AttributeValue::List(vec![
                        tri(1, 3, 2),
                        tri(1, 2, 4),
                        tri(1, 4, 3),
                        tri(2, 3, 4),
                    ]),
                    null(),
                ],
            ),
        ]
    }

    #[test]
    fn test_triangulated_tetrahedron() {
        let measure = process(&TriangulatedFaceSetProcessor::new(), tetrahedron(b(true)), 2).unwrap();
        assert_relative_eq!(measure.volume.unwrap(), 1.0 / 6.0, epsilon = 1e-12);
        let slanted = 3f64.sqrt() / 2.0;
        assert_relative_eq!(measure.surface_area, 1.5 + slanted, epsilon = 1e-12);
        assert_eq!(measure.bounding_box.max, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_open_face_set_has_no_volume() {
        let measure =
            process(&TriangulatedFaceSetProcessor::new(), tetrahedron(b(false)), 2).unwrap();
        assert!(measure.volume.is_none());
    }

    #[test]
    fn test_faceted_brep_cube() {
        let mut entities = Vec::new();
        let corners = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        for (i, c) in corners.iter().enumerate() {
            entities.push(point(i as u32 + 1, c));
        }
        // outward quads by corner id
        let quads = [
            [1, 4, 3, 2],
            [5, 6, 7, 8],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 4, 8, 7],
            [4, 1, 5, 8],
        ];
        let mut face_ids = Vec::new();
        for (i, quad) in quads.iter().enumerate() {
            let base = 100 + 10 * i as u32;
            entities.push(entity(base, IfcType::IfcPolyLoop, vec![refs(quad)]));
            entities.push(entity(base + 1, IfcType::IfcFaceOuterBound, vec![r(base), b(true)]));
            entities.push(entity(base + 2, IfcType::IfcFace, vec![refs(&[base + 1])]));
            face_ids.push(base + 2);
        }
        entities.push(entity(50, IfcType::IfcClosedShell, vec![refs(&face_ids)]));
        entities.push(entity(51, IfcType::IfcFacetedBrep, vec![r(50)]));

        let measure = process(&FacetedBrepProcessor::new(), entities, 51).unwrap();
        assert_relative_eq!(measure.volume.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(measure.surface_area, 6.0, epsilon = 1e-12);
    }
}
