// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property and quantity set index
//!
//! Sets reach an element through `IfcRelDefinesByProperties` on the
//! occurrence, or through `IfcRelDefinesByType` and the type object's
//! `HasPropertySets`. Occurrence sets come first so they take precedence.

use ifc_qto_model::{
    AttributeValue, DecodedEntity, EntityId, EntityResolver, IfcType, Property, PropertySet,
    PropertyValue, Quantity, QuantitySet, QuantityType,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Relationship caches for property sets, quantity sets and type objects
pub struct PropertyIndex {
    resolver: Arc<dyn EntityResolver>,
    /// Element ID -> property set IDs
    pset_cache: FxHashMap<u32, Vec<EntityId>>,
    /// Element ID -> element quantity IDs
    qset_cache: FxHashMap<u32, Vec<EntityId>>,
    /// Element ID -> type object ID
    type_cache: FxHashMap<u32, EntityId>,
}

impl PropertyIndex {
    /// Build the relationship caches
    pub fn build(resolver: Arc<dyn EntityResolver>) -> Self {
        let mut pset_cache: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();
        let mut qset_cache: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();
        let mut type_cache: FxHashMap<u32, EntityId> = FxHashMap::default();

        // IfcRelDefinesByProperties: RelatedObjects at 4, RelatingPropertyDefinition at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelDefinesByProperties) {
            let Some(related) = rel.get_refs(4) else {
                continue;
            };
            let Some(definition_id) = rel.get_ref(5) else {
                continue;
            };
            let Some(definition) = resolver.get(definition_id) else {
                continue;
            };

            let cache = match definition.ifc_type {
                IfcType::IfcPropertySet => &mut pset_cache,
                IfcType::IfcElementQuantity => &mut qset_cache,
                _ => continue,
            };
            for related_id in related {
                cache.entry(related_id.0).or_default().push(definition_id);
            }
        }

        // IfcRelDefinesByType: RelatedObjects at 4, RelatingType at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelDefinesByType) {
            let (Some(related), Some(type_id)) = (rel.get_refs(4), rel.get_ref(5)) else {
                continue;
            };
            for related_id in related {
                type_cache.entry(related_id.0).or_insert(type_id);
            }
        }

        log::debug!(
            "Property index: {} elements with property sets, {} with quantity sets, {} typed",
            pset_cache.len(),
            qset_cache.len(),
            type_cache.len()
        );

        Self {
            resolver,
            pset_cache,
            qset_cache,
            type_cache,
        }
    }

    /// Type object assigned to an element
    pub fn type_object(&self, id: EntityId) -> Option<EntityId> {
        self.type_cache.get(&id.0).copied()
    }

    /// Property sets of an element, occurrence sets first
    pub fn property_sets(&self, id: EntityId) -> Vec<PropertySet> {
        self.definitions(id, &self.pset_cache, &IfcType::IfcPropertySet)
            .iter()
            .map(|pset| PropertySet {
                name: set_name(pset),
                properties: self.extract_properties(pset),
            })
            .collect()
    }

    /// Quantity sets of an element, occurrence sets first
    pub fn quantity_sets(&self, id: EntityId) -> Vec<QuantitySet> {
        self.definitions(id, &self.qset_cache, &IfcType::IfcElementQuantity)
            .iter()
            .map(|qset| QuantitySet {
                name: set_name(qset),
                quantities: self.extract_quantities(qset),
            })
            .collect()
    }

    /// Occurrence definitions followed by type definitions of `kind`
    fn definitions(
        &self,
        id: EntityId,
        cache: &FxHashMap<u32, Vec<EntityId>>,
        kind: &IfcType,
    ) -> Vec<Arc<DecodedEntity>> {
        let mut ids: Vec<EntityId> = cache.get(&id.0).cloned().unwrap_or_default();

        // IfcTypeObject: HasPropertySets at 5
        if let Some(type_object) = self.type_object(id).and_then(|t| self.resolver.get(t)) {
            for type_set in type_object.get_refs(5).unwrap_or_default() {
                if !ids.contains(&type_set) {
                    ids.push(type_set);
                }
            }
        }

        ids.into_iter()
            .filter_map(|set_id| match self.resolver.get(set_id) {
                Some(set) => Some(set),
                None => {
                    log::debug!("Property definition {} for {} not decodable", set_id, id);
                    None
                }
            })
            .filter(|set| &set.ifc_type == kind)
            .collect()
    }

    /// IfcPropertySet: HasProperties at 4
    fn extract_properties(&self, pset: &DecodedEntity) -> Vec<Property> {
        pset.get(4)
            .map(|refs| self.resolver.resolve_ref_list(refs))
            .unwrap_or_default()
            .iter()
            .filter_map(|prop| extract_single_property(prop))
            .collect()
    }

    /// IfcElementQuantity: Quantities at 5
    fn extract_quantities(&self, qset: &DecodedEntity) -> Vec<Quantity> {
        qset.get(5)
            .map(|refs| self.resolver.resolve_ref_list(refs))
            .unwrap_or_default()
            .iter()
            .filter_map(|qty| extract_single_quantity(qty))
            .collect()
    }
}

/// Name at index 2 of a property definition
fn set_name(set: &DecodedEntity) -> String {
    set.get_string(2).unwrap_or("Unnamed").to_string()
}

/// IfcPropertySingleValue(Name, Description, NominalValue, Unit)
fn extract_single_property(prop: &DecodedEntity) -> Option<Property> {
    if prop.ifc_type != IfcType::IfcPropertySingleValue {
        return None;
    }
    let name = prop.get_string(0)?.to_string();
    let value = property_value(prop.get(2)?)?;
    Some(Property::new(name, value))
}

fn property_value(attr: &AttributeValue) -> Option<PropertyValue> {
    match attr {
        AttributeValue::Float(f) => Some(PropertyValue::Real(*f)),
        AttributeValue::Integer(i) => Some(PropertyValue::Integer(*i)),
        AttributeValue::Bool(b) => Some(PropertyValue::Boolean(*b)),
        AttributeValue::String(s) | AttributeValue::Enum(s) => Some(PropertyValue::Text(s.clone())),
        AttributeValue::TypedValue(_, args) => args.first().and_then(property_value),
        _ => None,
    }
}

/// IfcPhysicalSimpleQuantity(Name, Description, Unit, Value, ...)
fn extract_single_quantity(qty: &DecodedEntity) -> Option<Quantity> {
    let quantity_type = match qty.ifc_type {
        IfcType::IfcQuantityLength => QuantityType::Length,
        IfcType::IfcQuantityArea => QuantityType::Area,
        IfcType::IfcQuantityVolume => QuantityType::Volume,
        IfcType::IfcQuantityCount => QuantityType::Count,
        IfcType::IfcQuantityWeight => QuantityType::Weight,
        IfcType::IfcQuantityTime => QuantityType::Time,
        _ => return None,
    };
    let name = qty.get_string(0)?.to_string();
    let value = qty.get_float(3)?;
    Some(Quantity::new(name, value, quantity_type))
}
