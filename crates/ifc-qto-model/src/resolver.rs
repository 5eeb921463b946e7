// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity resolution trait for looking up and resolving IFC entities

use crate::{AttributeValue, DecodedEntity, EntityId, IfcType};
use std::sync::Arc;

/// Entity lookup and reference resolution
///
/// Implementations provide O(1) lookup by entity ID; decoded entities are
/// shared through `Arc` so repeated lookups stay cheap.
///
/// # Example
///
/// ```ignore
/// use ifc_qto_model::{EntityResolver, EntityId};
///
/// fn storey_name(resolver: &dyn EntityResolver, id: EntityId) -> Option<String> {
///     resolver.get(id).and_then(|storey| storey.get_label(2))
/// }
/// ```
pub trait EntityResolver: Send + Sync {
    /// Get entity by ID
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>>;

    /// Resolve an entity reference from an attribute value
    fn resolve_ref(&self, attr: &AttributeValue) -> Option<Arc<DecodedEntity>> {
        match attr {
            AttributeValue::EntityRef(id) => self.get(*id),
            _ => None,
        }
    }

    /// Resolve a list of entity references, skipping dangling ones
    fn resolve_ref_list(&self, attr: &AttributeValue) -> Vec<Arc<DecodedEntity>> {
        match attr {
            AttributeValue::List(items) => items
                .iter()
                .filter_map(|item| self.resolve_ref(item))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// IDs of all entities of exactly this type, in file order
    fn ids_by_type(&self, ifc_type: &IfcType) -> Vec<EntityId>;

    /// All entity types present in the file
    fn types(&self) -> Vec<IfcType>;

    /// Get all entities of a specific type
    fn entities_by_type(&self, ifc_type: &IfcType) -> Vec<Arc<DecodedEntity>> {
        self.ids_by_type(ifc_type)
            .into_iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Count entities of a specific type
    fn count_by_type(&self, ifc_type: &IfcType) -> usize {
        self.ids_by_type(ifc_type).len()
    }

    /// Get total entity count
    fn entity_count(&self) -> usize;
}

/// Extension methods for EntityResolver
pub trait EntityResolverExt: EntityResolver {
    /// Get entity or return error
    fn get_or_err(&self, id: EntityId) -> crate::Result<Arc<DecodedEntity>> {
        self.get(id).ok_or(crate::ParseError::EntityNotFound(id))
    }

    /// Resolve the reference held by `entity` at `attr_index` or return error
    fn resolve_attr(
        &self,
        entity: &DecodedEntity,
        attr_index: usize,
    ) -> crate::Result<Arc<DecodedEntity>> {
        entity
            .get(attr_index)
            .and_then(|attr| self.resolve_ref(attr))
            .ok_or(crate::ParseError::InvalidReference {
                entity: entity.id,
                attribute: attr_index,
            })
    }
}

// Blanket implementation for all EntityResolver types
impl<T: EntityResolver + ?Sized> EntityResolverExt for T {}
