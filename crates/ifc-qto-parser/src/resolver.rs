// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EntityResolver trait implementation

use crate::scanner::{EntityIndex, TypeIndex};
use crate::tokenizer::parse_entity_at;
use ifc_qto_model::{DecodedEntity, EntityId, EntityResolver, IfcType};
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};

/// Lazily decoding entity resolver
///
/// Entities are decoded on first access and cached behind a lock.
pub struct ResolverImpl {
    /// Raw file content
    content: String,
    /// Entity ID -> (start, end) byte offsets
    index: EntityIndex,
    /// Decoded entity cache
    cache: RwLock<FxHashMap<u32, Arc<DecodedEntity>>>,
    /// Type -> entity IDs index
    type_index: TypeIndex,
}

impl ResolverImpl {
    /// Create a resolver over already indexed content
    pub fn new(content: String, index: EntityIndex, type_index: TypeIndex) -> Self {
        Self {
            content,
            index,
            cache: RwLock::new(FxHashMap::default()),
            type_index,
        }
    }

    fn decode_and_cache(&self, id: u32) -> Option<Arc<DecodedEntity>> {
        {
            let cache = self.cache.read().ok()?;
            if let Some(cached) = cache.get(&id) {
                return Some(Arc::clone(cached));
            }
        }

        let (start, end) = self.index.get(&id)?;

        let entity = match parse_entity_at(&self.content, *start, *end) {
            Ok(entity) => entity,
            Err(e) => {
                log::debug!("Cannot decode entity #{}: {}", id, e);
                return None;
            }
        };
        let arc = Arc::new(entity);

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(id, Arc::clone(&arc));
        }

        Some(arc)
    }
}

impl EntityResolver for ResolverImpl {
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>> {
        self.decode_and_cache(id.0)
    }

    fn ids_by_type(&self, ifc_type: &IfcType) -> Vec<EntityId> {
        self.type_index.get(ifc_type).cloned().unwrap_or_default()
    }

    fn types(&self) -> Vec<IfcType> {
        self.type_index.keys().cloned().collect()
    }

    fn count_by_type(&self, ifc_type: &IfcType) -> usize {
        self.type_index.get(ifc_type).map(|v| v.len()).unwrap_or(0)
    }

    fn entity_count(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::EntityScanner;

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('guid',$,'Project',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#4=IFCWALL('guid2',$,'Wall 1',$,$,$,$,$);
#5=IFCWALL('guid3',$,'broken' $);
ENDSEC;
END-ISO-10303-21;
"#;

    fn resolver() -> ResolverImpl {
        let (index, types) = EntityScanner::build_index(TEST_IFC);
        ResolverImpl::new(TEST_IFC.to_string(), index, types)
    }

    #[test]
    fn test_resolver_get() {
        let resolver = resolver();
        let entity = resolver.get(EntityId(1)).unwrap();
        assert_eq!(entity.id, EntityId(1));
        assert_eq!(resolver.entity_count(), 5);
    }

    #[test]
    fn test_resolver_resolves_reference() {
        let resolver = resolver();
        let project = resolver.get(EntityId(1)).unwrap();
        let units = resolver.resolve_ref(project.get(8).unwrap()).unwrap();
        assert_eq!(units.ifc_type, IfcType::IfcUnitAssignment);
        assert_eq!(resolver.resolve_ref_list(units.get(0).unwrap()).len(), 1);
    }

    #[test]
    fn test_malformed_entity_is_absent() {
        let resolver = resolver();
        assert!(resolver.get(EntityId(5)).is_none());
        assert!(resolver.get(EntityId(99)).is_none());
        // still indexed by type, just not decodable
        assert_eq!(resolver.count_by_type(&IfcType::IfcWall), 2);
        assert_eq!(resolver.entities_by_type(&IfcType::IfcWall).len(), 1);
    }

    #[test]
    fn test_resolver_thread_safe() {
        use std::thread;

        let resolver = Arc::new(resolver());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                thread::spawn(move || {
                    for id in 1..=4 {
                        assert!(resolver.get(EntityId(id)).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
