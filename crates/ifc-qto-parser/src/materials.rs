// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material association lookup
//!
//! Follows `IfcRelAssociatesMaterial` from an element (or its type object)
//! through the material select shapes down to `IfcMaterial` names.

use ifc_qto_model::{DecodedEntity, EntityId, EntityResolver, IfcType};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Nesting limit for material select resolution
const MAX_DEPTH: usize = 8;

/// Element -> associated material definition
pub struct MaterialIndex {
    resolver: Arc<dyn EntityResolver>,
    associations: FxHashMap<u32, EntityId>,
}

impl MaterialIndex {
    /// Build the association map
    pub fn build(resolver: Arc<dyn EntityResolver>) -> Self {
        let mut associations = FxHashMap::default();

        // IfcRelAssociatesMaterial: RelatedObjects at 4, RelatingMaterial at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelAssociatesMaterial) {
            let (Some(related), Some(material)) = (rel.get_refs(4), rel.get_ref(5)) else {
                continue;
            };
            for object in related {
                associations.entry(object.0).or_insert(material);
            }
        }

        Self {
            resolver,
            associations,
        }
    }

    /// Material names for an element; the type object's association is used
    /// when the occurrence has none
    pub fn material_names(&self, element: EntityId, type_object: Option<EntityId>) -> Vec<String> {
        let association = self
            .associations
            .get(&element.0)
            .or_else(|| type_object.and_then(|t| self.associations.get(&t.0)));

        let Some(definition) = association.and_then(|id| self.resolver.get(*id)) else {
            return Vec::new();
        };

        let mut names = Vec::new();
        self.collect_names(&definition, 0, &mut names);
        names
    }

    fn collect_names(&self, definition: &DecodedEntity, depth: usize, names: &mut Vec<String>) {
        if depth > MAX_DEPTH {
            log::debug!("Material definition {} nested too deep", definition.id);
            return;
        }

        let children: Vec<Arc<DecodedEntity>> = match definition.ifc_type {
            // IfcMaterial(Name, ...)
            IfcType::IfcMaterial => {
                if let Some(name) = definition.get_label(0) {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
                return;
            }
            // IfcMaterialList(Materials), IfcMaterialLayerSet(MaterialLayers, ...),
            // IfcMaterialLayer(Material, ...) and the set usages (ForLayerSet /
            // ForProfileSet, ...) all lead on through attribute 0
            IfcType::IfcMaterialList
            | IfcType::IfcMaterialLayerSetUsage
            | IfcType::IfcMaterialProfileSetUsage
            | IfcType::IfcMaterialLayerSet
            | IfcType::IfcMaterialLayer => self.refs(definition, 0),
            // IfcMaterialProfileSet(Name, Description, MaterialProfiles, ...),
            // IfcMaterialProfile(Name, Description, Material, ...) and the
            // constituent pair use attribute 2
            IfcType::IfcMaterialProfileSet
            | IfcType::IfcMaterialProfile
            | IfcType::IfcMaterialConstituentSet
            | IfcType::IfcMaterialConstituent => self.refs(definition, 2),
            _ => {
                log::debug!(
                    "Unsupported material definition {} ({})",
                    definition.id,
                    definition.ifc_type
                );
                return;
            }
        };

        for child in children {
            self.collect_names(&child, depth + 1, names);
        }
    }

    /// A single reference or a list of references at `index`
    fn refs(&self, entity: &DecodedEntity, index: usize) -> Vec<Arc<DecodedEntity>> {
        match entity.get(index) {
            Some(attr) if attr.as_list().is_some() => self.resolver.resolve_ref_list(attr),
            Some(attr) => self.resolver.resolve_ref(attr).into_iter().collect(),
            None => Vec::new(),
        }
    }
}
