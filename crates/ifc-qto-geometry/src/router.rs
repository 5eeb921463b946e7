// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry Router - Dynamic dispatch to measurement processors
//!
//! Routes representation items to processors based on type and follows the
//! product -> shape representation -> item chain for whole elements.

use crate::shape::{ElementShape, SolidMeasure};
use crate::{Error, Result};
use ifc_qto_model::{DecodedEntity, EntityResolver, IfcType};
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Deepest mapped item / boolean operand nesting followed
const MAX_DEPTH: usize = 16;

/// Representation identifiers that describe the body of a product
const BODY_IDENTIFIERS: [&str; 2] = ["Body", "Facetation"];

/// Geometry processor trait
///
/// Each processor measures one or more types of solid representation items.
/// Processors use the `EntityResolver` trait for entity lookups, making them
/// independent of any specific parser implementation.
pub trait GeometryProcessor: Send + Sync {
    /// Measure an item in file units
    fn process(&self, entity: &DecodedEntity, resolver: &dyn EntityResolver) -> Result<SolidMeasure>;

    /// Get supported IFC types
    fn supported_types(&self) -> Vec<IfcType>;
}

/// Geometry router - routes items to processors
///
/// Mapped items are resolved through their representation map and cached
/// per mapped representation, so instanced types are only measured once.
pub struct GeometryRouter {
    /// Registered processors by type
    processors: HashMap<IfcType, Arc<dyn GeometryProcessor>>,
    /// Mapped representation ID -> item measures
    mapped_cache: RwLock<FxHashMap<u32, Vec<SolidMeasure>>>,
}

impl GeometryRouter {
    /// Create new router without any processors registered
    pub fn new() -> Self {
        Self {
            processors: HashMap::new(),
            mapped_cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Create router with default processors registered
    ///
    /// Registers the following processors:
    /// - `ExtrudedAreaSolidProcessor` (IfcExtrudedAreaSolid)
    /// - `TriangulatedFaceSetProcessor` (IfcTriangulatedFaceSet)
    /// - `FacetedBrepProcessor` (IfcFacetedBrep)
    pub fn with_default_processors() -> Self {
        use crate::processors::{
            ExtrudedAreaSolidProcessor, FacetedBrepProcessor, TriangulatedFaceSetProcessor,
        };

        let mut router = Self::new();
        router.register(Arc::new(ExtrudedAreaSolidProcessor::new()));
        router.register(Arc::new(TriangulatedFaceSetProcessor::new()));
        router.register(Arc::new(FacetedBrepProcessor::new()));
        router
    }

    /// Register a geometry processor
    pub fn register(&mut self, processor: Arc<dyn GeometryProcessor>) {
        for ifc_type in processor.supported_types() {
            self.processors.insert(ifc_type, Arc::clone(&processor));
        }
    }

    /// Check if a type has a registered processor
    pub fn has_processor(&self, ifc_type: &IfcType) -> bool {
        self.processors.contains_key(ifc_type)
    }

    /// Measure a product's body geometry
    ///
    /// Follows the IFC representation chain:
    /// Product -> ProductDefinitionShape -> ShapeRepresentation -> Items.
    /// Returns `None` when the product has no measurable body. Object
    /// placement is not applied; bounding boxes are in the product's own
    /// coordinate system.
    pub fn measure_product(
        &self,
        product: &DecodedEntity,
        resolver: &dyn EntityResolver,
    ) -> Result<Option<ElementShape>> {
        // Representation at index 6 for products
        let Some(rep_id) = product.get_ref(6) else {
            return Ok(None);
        };
        let definition = resolver
            .get(rep_id)
            .ok_or_else(|| Error::missing(rep_id))?;

        // IfcProductDefinitionShape: Representations at index 2
        let mut items = Vec::new();
        for shape_rep in definition
            .get(2)
            .map(|reps| resolver.resolve_ref_list(reps))
            .unwrap_or_default()
        {
            // IfcShapeRepresentation: RepresentationIdentifier at index 1
            if let Some(identifier) = shape_rep.get_string(1) {
                if !BODY_IDENTIFIERS.iter().any(|body| *body == identifier) {
                    continue;
                }
            }
            items.extend(self.measure_shape_representation(&shape_rep, resolver, 0)?);
        }

        if items.is_empty() {
            log::debug!("No measurable body items for {}", product.id);
            return Ok(None);
        }
        Ok(Some(ElementShape::new(product.id, items)))
    }

    /// Measure a single representation item
    ///
    /// Mapped items expand to the items of their mapped representation;
    /// boolean results are measured by their first operand only.
    pub fn measure_item(
        &self,
        item: &DecodedEntity,
        resolver: &dyn EntityResolver,
    ) -> Result<Vec<SolidMeasure>> {
        self.measure_item_at(item, resolver, 0)
    }

    fn measure_item_at(
        &self,
        item: &DecodedEntity,
        resolver: &dyn EntityResolver,
        depth: usize,
    ) -> Result<Vec<SolidMeasure>> {
        if depth > MAX_DEPTH {
            return Err(Error::degenerate(format!(
                "Item {} nested deeper than {} levels",
                item.id, MAX_DEPTH
            )));
        }

        match item.ifc_type {
            IfcType::IfcMappedItem => self.measure_mapped_item(item, resolver, depth),
            IfcType::IfcBooleanResult | IfcType::IfcBooleanClippingResult => {
                // FirstOperand at index 1
                let operand = item
                    .get_ref(1)
                    .and_then(|id| resolver.get(id))
                    .ok_or_else(|| Error::attribute(1, "Missing FirstOperand"))?;
                self.measure_item_at(&operand, resolver, depth + 1)
            }
            _ => {
                let processor = self
                    .processors
                    .get(&item.ifc_type)
                    .ok_or_else(|| Error::unsupported(item.ifc_type.to_string()))?;
                Ok(vec![processor.process(item, resolver)?])
            }
        }
    }

    /// IfcMappedItem: MappingSource at 0 -> IfcRepresentationMap:
    /// MappedRepresentation at 1
    fn measure_mapped_item(
        &self,
        item: &DecodedEntity,
        resolver: &dyn EntityResolver,
        depth: usize,
    ) -> Result<Vec<SolidMeasure>> {
        let source = item
            .get_ref(0)
            .and_then(|id| resolver.get(id))
            .ok_or_else(|| Error::attribute(0, "Missing MappingSource"))?;
        let rep_id = source
            .get_ref(1)
            .ok_or_else(|| Error::attribute(1, "Missing MappedRepresentation"))?;

        if let Ok(cache) = self.mapped_cache.read() {
            if let Some(cached) = cache.get(&rep_id.0) {
                return Ok(cached.clone());
            }
        }

        let representation = resolver
            .get(rep_id)
            .ok_or_else(|| Error::missing(rep_id))?;
        let measures = self.measure_shape_representation(&representation, resolver, depth + 1)?;

        if let Ok(mut cache) = self.mapped_cache.write() {
            cache.insert(rep_id.0, measures.clone());
        }
        Ok(measures)
    }

    /// Measure all items of a shape representation
    ///
    /// One item that cannot be measured fails the whole representation.
    fn measure_shape_representation(
        &self,
        shape_rep: &DecodedEntity,
        resolver: &dyn EntityResolver,
        depth: usize,
    ) -> Result<Vec<SolidMeasure>> {
        // Items at index 3 in IfcShapeRepresentation
        let items = shape_rep
            .get(3)
            .map(|items| resolver.resolve_ref_list(items))
            .unwrap_or_default();

        let mut measures = Vec::new();
        for item in items {
            let item_measures = self.measure_item_at(&item, resolver, depth).map_err(|e| {
                log::debug!("Item {} ({}) of {} failed: {}", item.id, item.ifc_type, shape_rep.id, e);
                e
            })?;
            measures.extend(item_measures);
        }
        Ok(measures)
    }

    /// Clear the mapped representation cache
    pub fn clear_caches(&self) {
        if let Ok(mut cache) = self.mapped_cache.write() {
            cache.clear();
        }
    }
}

impl Default for GeometryRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use approx::assert_relative_eq;
    use ifc_qto_model::{EntityId, ShapeGeometry};

    #[test]
    fn test_router_creation() {
        let router = GeometryRouter::new();
        assert!(!router.has_processor(&IfcType::IfcExtrudedAreaSolid));

        let router = GeometryRouter::with_default_processors();
        assert!(router.has_processor(&IfcType::IfcExtrudedAreaSolid));
        assert!(router.has_processor(&IfcType::IfcTriangulatedFaceSet));
        assert!(router.has_processor(&IfcType::IfcFacetedBrep));
    }

    /// A 1 x 2 x 3 block reached through a mapped item, inside a boolean
    /// clipping, next to an axis representation that must be ignored
    fn column() -> MapResolver {
        MapResolver::new(vec![
            entity(
                1,
                IfcType::IfcRectangleProfileDef,
                vec![e("AREA"), null(), null(), f(1.0), f(2.0)],
            ),
            dir(2, &[0.0, 0.0, 1.0]),
            entity(3, IfcType::IfcExtrudedAreaSolid, vec![r(1), null(), r(2), f(3.0)]),
            entity(
                4,
                IfcType::IfcBooleanClippingResult,
                vec![e("DIFFERENCE"), r(3), r(99)],
            ),
            entity(
                5,
                IfcType::IfcShapeRepresentation,
                vec![r(90), s("Body"), s("SweptSolid"), refs(&[4])],
            ),
            entity(6, IfcType::IfcRepresentationMap, vec![r(91), r(5)]),
            entity(7, IfcType::IfcMappedItem, vec![r(6), r(92)]),
            entity(
                8,
                IfcType::IfcShapeRepresentation,
                vec![r(90), s("Body"), s("MappedRepresentation"), refs(&[7])],
            ),
            entity(
                9,
                IfcType::IfcShapeRepresentation,
                vec![r(90), s("Axis"), s("Curve3D"), refs(&[1])],
            ),
            entity(
                10,
                IfcType::IfcProductDefinitionShape,
                vec![null(), null(), refs(&[9, 8])],
            ),
            entity(
                20,
                IfcType::IfcColumn,
                vec![s("guid"), null(), s("C1"), null(), null(), null(), r(10), null()],
            ),
            entity(
                21,
                IfcType::IfcColumn,
                vec![s("guid2"), null(), s("C2"), null(), null(), null(), null(), null()],
            ),
        ])
    }

    #[test]
    fn test_measure_product_through_mapped_boolean() {
        let resolver = column();
        let router = GeometryRouter::with_default_processors();
        let product = resolver.get(EntityId(20)).unwrap();

        let shape = router.measure_product(&product, &resolver).unwrap().unwrap();
        assert_eq!(shape.items().len(), 1);
        assert_relative_eq!(shape.volume().unwrap(), 6.0);
        assert_relative_eq!(shape.surface_area().unwrap(), 22.0);
        assert_relative_eq!(shape.bounding_box().unwrap().longest_side(), 3.0);

        // second lookup comes from the mapped representation cache
        let again = router.measure_product(&product, &resolver).unwrap().unwrap();
        assert_eq!(again.items(), shape.items());
    }

    #[test]
    fn test_product_without_representation() {
        let resolver = column();
        let router = GeometryRouter::with_default_processors();
        let product = resolver.get(EntityId(21)).unwrap();
        assert!(router.measure_product(&product, &resolver).unwrap().is_none());
    }

    #[test]
    fn test_unsupported_item() {
        let resolver = column();
        let router = GeometryRouter::with_default_processors();
        let profile = resolver.get(EntityId(1)).unwrap();
        assert!(matches!(
            router.measure_item(&profile, &resolver),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_one_unmeasurable_item_fails_the_body() {
        let mut entities = vec![
            entity(
                1,
                IfcType::IfcRectangleProfileDef,
                vec![e("AREA"), null(), null(), f(1.0), f(2.0)],
            ),
            dir(2, &[0.0, 0.0, 1.0]),
            entity(3, IfcType::IfcExtrudedAreaSolid, vec![r(1), null(), r(2), f(3.0)]),
            entity(4, IfcType::parse("IFCSWEPTDISKSOLID"), vec![r(99), f(0.1)]),
            entity(
                5,
                IfcType::IfcShapeRepresentation,
                vec![r(90), s("Body"), s("SweptSolid"), refs(&[3, 4])],
            ),
            entity(6, IfcType::IfcProductDefinitionShape, vec![null(), null(), refs(&[5])]),
            entity(
                20,
                IfcType::IfcBeam,
                vec![s("guid"), null(), s("B1"), null(), null(), null(), r(6), null()],
            ),
        ];
        let router = GeometryRouter::with_default_processors();

        let resolver = MapResolver::new(entities.clone());
        let product = resolver.get(EntityId(20)).unwrap();
        assert!(matches!(
            router.measure_product(&product, &resolver),
            Err(Error::Unsupported(_))
        ));

        // the extrusion alone measures fine
        entities[4] = entity(
            5,
            IfcType::IfcShapeRepresentation,
            vec![r(90), s("Body"), s("SweptSolid"), refs(&[3])],
        );
        let resolver = MapResolver::new(entities);
        let shape = router.measure_product(&product, &resolver).unwrap().unwrap();
        assert_relative_eq!(shape.volume().unwrap(), 6.0);
    }
}
