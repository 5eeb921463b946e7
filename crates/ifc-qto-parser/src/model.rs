// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IfcDocument - `ElementSource` over a parsed STEP file

use crate::materials::MaterialIndex;
use crate::properties::PropertyIndex;
use crate::resolver::ResolverImpl;
use crate::scanner::{parse_header, EntityScanner};
use crate::spatial::StoreyIndex;
use crate::units::unit_descriptors;

use ifc_qto_geometry::GeometryRouter;
use ifc_qto_model::{
    DecodedEntity, Element, ElementSource, EntityId, EntityResolver, EntityResolverExt, IfcType,
    ModelMetadata, ParseError, ProjectMetadata, PropertySet, QuantitySet, Result, ShapeGeometry,
    UnitDescriptor,
};
use std::path::Path;
use std::sync::Arc;

/// A loaded IFC document
///
/// Relationship indexes are built once at load; entities are decoded lazily
/// as the take-off asks for them.
pub struct IfcDocument {
    /// Entity resolver for lookups
    resolver: Arc<ResolverImpl>,
    /// Property and quantity sets
    properties: PropertyIndex,
    /// Material associations
    materials: MaterialIndex,
    /// Storey containment
    storeys: StoreyIndex,
    /// Body geometry measurement
    geometry: GeometryRouter,
    /// File metadata
    metadata: ModelMetadata,
}

impl IfcDocument {
    /// Parse IFC content
    pub fn parse(content: &str) -> Result<Self> {
        let body = content.trim_start_matches('\u{feff}').trim_start();
        if !body.starts_with("ISO-10303-21") {
            return Err(ParseError::format("missing ISO-10303-21 signature"));
        }
        if memchr::memmem::find(body.as_bytes(), b"DATA;").is_none() {
            return Err(ParseError::format("missing DATA section"));
        }

        let (index, type_index) = EntityScanner::build_index(content);
        if index.is_empty() {
            return Err(ParseError::format("DATA section holds no entities"));
        }

        let metadata = parse_header(content);
        let resolver = Arc::new(ResolverImpl::new(content.to_string(), index, type_index));
        let shared: Arc<dyn EntityResolver> = resolver.clone();

        let properties = PropertyIndex::build(Arc::clone(&shared));
        let materials = MaterialIndex::build(shared);
        let storeys = StoreyIndex::build(resolver.as_ref());

        log::debug!(
            "Indexed {} entities ({})",
            resolver.entity_count(),
            metadata.schema_version
        );

        Ok(Self {
            resolver,
            properties,
            materials,
            storeys,
            geometry: GeometryRouter::with_default_processors(),
            metadata,
        })
    }

    /// Read and parse an IFC file
    ///
    /// Non UTF-8 bytes are replaced; STEP text is 7-bit with escapes, so this
    /// only affects files that break the encoding rules.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        let document = Self::parse(&content)?;
        log::info!(
            "Loaded {} ({}, {} entities)",
            path.display(),
            document.metadata.schema_version,
            document.resolver.entity_count()
        );
        Ok(document)
    }

    /// Header metadata
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Entity resolver
    pub fn resolver(&self) -> &dyn EntityResolver {
        self.resolver.as_ref()
    }

    fn element(entity: &DecodedEntity) -> Element {
        // IfcElement: GlobalId(0), Name(2), Tag(7); IFC4 PredefinedType(8)
        Element {
            id: entity.id,
            ifc_type: entity.ifc_type.clone(),
            global_id: entity.get_label(0),
            name: entity.get_label(2),
            tag: entity.get_label(7),
            predefined_type: entity.get_enum(8).map(str::to_string),
        }
    }

    /// Name and GlobalId of the first entity of a type
    fn first_identity(&self, ifc_type: &IfcType) -> (Option<String>, Option<String>) {
        match self.resolver.entities_by_type(ifc_type).first() {
            Some(entity) => (entity.get_label(2), entity.get_label(0)),
            None => (None, None),
        }
    }
}

impl ElementSource for IfcDocument {
    fn elements_by_type(&self, ifc_type: &IfcType) -> Result<Vec<Element>> {
        let mut ids: Vec<EntityId> = self
            .resolver
            .types()
            .iter()
            .filter(|t| t.is_a(ifc_type))
            .flat_map(|t| self.resolver.ids_by_type(t))
            .collect();
        ids.sort();

        Ok(ids
            .into_iter()
            .filter_map(|id| match self.resolver.get(id) {
                Some(entity) => Some(Self::element(&entity)),
                None => {
                    log::warn!("Skipping undecodable {} entity {}", ifc_type, id);
                    None
                }
            })
            .collect())
    }

    fn quantity_sets(&self, id: EntityId) -> Result<Vec<QuantitySet>> {
        Ok(self.properties.quantity_sets(id))
    }

    fn property_sets(&self, id: EntityId) -> Result<Vec<PropertySet>> {
        Ok(self.properties.property_sets(id))
    }

    fn shape(&self, id: EntityId) -> Result<Option<Box<dyn ShapeGeometry + '_>>> {
        let product = self.resolver.get_or_err(id)?;
        let shape = self
            .geometry
            .measure_product(&product, self.resolver.as_ref())
            .map_err(|e| ParseError::geometry(id, e.to_string()))?;
        Ok(shape.map(|s| Box::new(s) as Box<dyn ShapeGeometry>))
    }

    fn materials(&self, id: EntityId) -> Result<Vec<String>> {
        Ok(self
            .materials
            .material_names(id, self.properties.type_object(id)))
    }

    fn containing_storey(&self, id: EntityId) -> Result<Option<String>> {
        Ok(self.storeys.storey_name(id))
    }

    fn unit_metadata(&self) -> Result<Vec<UnitDescriptor>> {
        unit_descriptors(self.resolver.as_ref())
    }

    fn project_metadata(&self) -> ProjectMetadata {
        let (project_name, project_id) = self.first_identity(&IfcType::IfcProject);
        let (building_name, building_id) = self.first_identity(&IfcType::IfcBuilding);
        ProjectMetadata {
            schema: self.metadata.schema_version.clone(),
            project_name,
            project_id,
            building_name,
            building_id,
        }
    }
}
