// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory element source for unit tests

use ifc_qto_model::{
    BoundingBox, Element, ElementSource, EntityId, IfcType, ParseError, ProjectMetadata,
    PropertySet, QuantitySet, Result, ShapeGeometry, UnitDescriptor,
};
use std::collections::HashMap;

/// Canned measurements; an absent measure fails like a broken solid
#[derive(Clone, Debug, Default)]
pub struct MockShape {
    pub volume: Option<f64>,
    pub area: Option<f64>,
    pub bbox: Option<BoundingBox>,
}

impl ShapeGeometry for MockShape {
    fn volume(&self) -> Result<f64> {
        self.volume
            .ok_or_else(|| ParseError::other("volume not computable"))
    }

    fn surface_area(&self) -> Result<f64> {
        self.area
            .ok_or_else(|| ParseError::other("area not computable"))
    }

    fn bounding_box(&self) -> Result<BoundingBox> {
        self.bbox
            .ok_or_else(|| ParseError::other("no bounding box"))
    }
}

#[derive(Default)]
pub struct MockSource {
    pub elements: Vec<Element>,
    pub qsets: HashMap<u32, Vec<QuantitySet>>,
    pub psets: HashMap<u32, Vec<PropertySet>>,
    pub shapes: HashMap<u32, MockShape>,
    pub materials: HashMap<u32, Vec<String>>,
    pub storeys: HashMap<u32, String>,
    pub units: Vec<UnitDescriptor>,
    /// Element ids whose lookups all fail
    pub broken: Vec<u32>,
    pub metadata: ProjectMetadata,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            units: vec![UnitDescriptor::si("LENGTHUNIT", None, "METRE")],
            ..Default::default()
        }
    }

    /// Add an element and return its id
    pub fn element(&mut self, id: u32, ifc_type: IfcType) -> EntityId {
        self.elements.push(Element::new(EntityId(id), ifc_type));
        EntityId(id)
    }

    pub fn named(&mut self, id: u32, ifc_type: IfcType, name: &str) -> EntityId {
        let mut element = Element::new(EntityId(id), ifc_type);
        element.name = Some(name.to_string());
        self.elements.push(element);
        EntityId(id)
    }

    pub fn get_element(&self, id: u32) -> Element {
        self.elements
            .iter()
            .find(|e| e.id.0 == id)
            .cloned()
            .unwrap_or_else(|| panic!("no element {}", id))
    }

    fn check(&self, id: EntityId) -> Result<()> {
        if self.broken.contains(&id.0) {
            return Err(ParseError::EntityNotFound(id));
        }
        Ok(())
    }
}

impl ElementSource for MockSource {
    fn elements_by_type(&self, ifc_type: &IfcType) -> Result<Vec<Element>> {
        Ok(self
            .elements
            .iter()
            .filter(|e| e.ifc_type.is_a(ifc_type))
            .cloned()
            .collect())
    }

    fn quantity_sets(&self, id: EntityId) -> Result<Vec<QuantitySet>> {
        self.check(id)?;
        Ok(self.qsets.get(&id.0).cloned().unwrap_or_default())
    }

    fn property_sets(&self, id: EntityId) -> Result<Vec<PropertySet>> {
        self.check(id)?;
        Ok(self.psets.get(&id.0).cloned().unwrap_or_default())
    }

    fn shape(&self, id: EntityId) -> Result<Option<Box<dyn ShapeGeometry + '_>>> {
        self.check(id)?;
        Ok(self
            .shapes
            .get(&id.0)
            .map(|shape| Box::new(shape.clone()) as Box<dyn ShapeGeometry>))
    }

    fn materials(&self, id: EntityId) -> Result<Vec<String>> {
        self.check(id)?;
        Ok(self.materials.get(&id.0).cloned().unwrap_or_default())
    }

    fn containing_storey(&self, id: EntityId) -> Result<Option<String>> {
        self.check(id)?;
        Ok(self.storeys.get(&id.0).cloned())
    }

    fn unit_metadata(&self) -> Result<Vec<UnitDescriptor>> {
        Ok(self.units.clone())
    }

    fn project_metadata(&self) -> ProjectMetadata {
        self.metadata.clone()
    }
}
