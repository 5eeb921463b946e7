// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory resolver and entity builders for unit tests

use ifc_qto_model::{AttributeValue, DecodedEntity, EntityId, EntityResolver, IfcType};
use rustc_hash::FxHashMap;
use std::sync::Arc;

pub struct MapResolver {
    entities: FxHashMap<u32, Arc<DecodedEntity>>,
}

impl MapResolver {
    pub fn new(entities: Vec<DecodedEntity>) -> Self {
        Self {
            entities: entities
                .into_iter()
                .map(|e| (e.id.0, Arc::new(e)))
                .collect(),
        }
    }
}

impl EntityResolver for MapResolver {
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>> {
        self.entities.get(&id.0).cloned()
    }

    fn ids_by_type(&self, ifc_type: &IfcType) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| &e.ifc_type == ifc_type)
            .map(|e| e.id)
            .collect();
        ids.sort();
        ids
    }

    fn types(&self) -> Vec<IfcType> {
        self.entities.values().map(|e| e.ifc_type.clone()).collect()
    }

    fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

pub fn entity(id: u32, ifc_type: IfcType, attributes: Vec<AttributeValue>) -> DecodedEntity {
    DecodedEntity {
        id: EntityId(id),
        ifc_type,
        attributes,
    }
}

pub fn r(id: u32) -> AttributeValue {
    AttributeValue::EntityRef(EntityId(id))
}

pub fn refs(ids: &[u32]) -> AttributeValue {
    AttributeValue::List(ids.iter().map(|id| r(*id)).collect())
}

pub fn f(value: f64) -> AttributeValue {
    AttributeValue::Float(value)
}

pub fn s(value: &str) -> AttributeValue {
    AttributeValue::String(value.to_string())
}

pub fn e(value: &str) -> AttributeValue {
    AttributeValue::Enum(value.to_string())
}

pub fn b(value: bool) -> AttributeValue {
    AttributeValue::Bool(value)
}

pub fn null() -> AttributeValue {
    AttributeValue::Null
}

pub fn floats(values: &[f64]) -> AttributeValue {
    AttributeValue::List(values.iter().map(|v| f(*v)).collect())
}

pub fn point(id: u32, coords: &[f64]) -> DecodedEntity {
    entity(id, IfcType::IfcCartesianPoint, vec![floats(coords)])
}

pub fn dir(id: u32, ratios: &[f64]) -> DecodedEntity {
    entity(id, IfcType::IfcDirection, vec![floats(ratios)])
}
