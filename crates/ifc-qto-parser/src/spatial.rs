// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Storey containment lookup

use ifc_qto_model::{EntityId, EntityResolver, IfcType};
use rustc_hash::FxHashMap;

/// Longest containment chain followed before giving up
const MAX_DEPTH: usize = 32;

/// Element -> parent maps for spatial containment and aggregation
///
/// An element is placed on a storey when it is contained in it directly,
/// contained in a space of it, or aggregated into something that is.
pub struct StoreyIndex {
    /// Element ID -> containing spatial structure
    contained_in: FxHashMap<u32, EntityId>,
    /// Part ID -> whole it is aggregated into
    aggregated_in: FxHashMap<u32, EntityId>,
    /// Storey ID -> display name
    storey_names: FxHashMap<u32, String>,
}

impl StoreyIndex {
    /// Build the containment maps from relationship entities
    pub fn build(resolver: &dyn EntityResolver) -> Self {
        let mut contained_in = FxHashMap::default();
        let mut aggregated_in = FxHashMap::default();
        let mut storey_names = FxHashMap::default();

        // IfcRelContainedInSpatialStructure: RelatedElements at 4, RelatingStructure at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelContainedInSpatialStructure) {
            let (Some(elements), Some(structure)) = (rel.get_refs(4), rel.get_ref(5)) else {
                continue;
            };
            for element in elements {
                contained_in.entry(element.0).or_insert(structure);
            }
        }

        // IfcRelAggregates: RelatingObject at 4, RelatedObjects at 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelAggregates) {
            let (Some(whole), Some(parts)) = (rel.get_ref(4), rel.get_refs(5)) else {
                continue;
            };
            for part in parts {
                aggregated_in.entry(part.0).or_insert(whole);
            }
        }

        // IfcBuildingStorey: Name at 2, LongName at 7
        for storey in resolver.entities_by_type(&IfcType::IfcBuildingStorey) {
            match storey.get_label(2).or_else(|| storey.get_label(7)) {
                Some(name) => {
                    storey_names.insert(storey.id.0, name);
                }
                None => log::debug!("Storey {} has neither Name nor LongName", storey.id),
            }
        }

        Self {
            contained_in,
            aggregated_in,
            storey_names,
        }
    }

    /// Name of the storey an element sits on
    pub fn storey_name(&self, element: EntityId) -> Option<String> {
        let mut current = element;
        for _ in 0..MAX_DEPTH {
            let parent = self
                .contained_in
                .get(&current.0)
                .or_else(|| self.aggregated_in.get(&current.0))?;
            if let Some(name) = self.storey_names.get(&parent.0) {
                return Some(name.clone());
            }
            current = *parent;
        }
        log::debug!("Containment chain of {} exceeds {} levels", element, MAX_DEPTH);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolverImpl;
    use crate::scanner::EntityScanner;

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('p',$,'Project',$,$,$,$,$,$);
#6=IFCBUILDING('b',$,'Building',$,$,$,$,$,$,$,$,$);
#8=IFCBUILDINGSTOREY('s1',$,'Ground Floor',$,$,$,$,$,.ELEMENT.,0.0);
#9=IFCBUILDINGSTOREY('s2',$,$,$,$,$,$,'Level 2',.ELEMENT.,3000.0);
#12=IFCRELAGGREGATES('a1',$,$,$,#6,(#8,#9));
#13=IFCSPACE('sp',$,'Room',$,$,$,$,$,.ELEMENT.,.INTERNAL.,$);
#14=IFCRELAGGREGATES('a2',$,$,$,#9,(#13));
#20=IFCWALL('w1',$,'Wall 1',$,$,$,$,$);
#21=IFCSTAIR('st',$,'Stair',$,$,$,$,$,$);
#22=IFCSTAIRFLIGHT('sf',$,'Flight',$,$,$,$,$,$,$,$);
#23=IFCCOLUMN('c1',$,'Column in room',$,$,$,$,$);
#24=IFCBEAM('b1',$,'Loose beam',$,$,$,$,$);
#30=IFCRELCONTAINEDINSPATIALSTRUCTURE('r1',$,$,$,(#20,#21),#8);
#31=IFCRELAGGREGATES('a3',$,$,$,#21,(#22));
#32=IFCRELCONTAINEDINSPATIALSTRUCTURE('r2',$,$,$,(#23),#13);
ENDSEC;
END-ISO-10303-21;
"#;

    fn index() -> StoreyIndex {
        let (index, types) = EntityScanner::build_index(TEST_IFC);
        let resolver = ResolverImpl::new(TEST_IFC.to_string(), index, types);
        StoreyIndex::build(&resolver)
    }

    #[test]
    fn test_direct_containment() {
        assert_eq!(index().storey_name(EntityId(20)).as_deref(), Some("Ground Floor"));
    }

    #[test]
    fn test_aggregated_part_inherits_storey() {
        assert_eq!(index().storey_name(EntityId(22)).as_deref(), Some("Ground Floor"));
    }

    #[test]
    fn test_space_containment_walks_up_with_long_name() {
        assert_eq!(index().storey_name(EntityId(23)).as_deref(), Some("Level 2"));
    }

    #[test]
    fn test_uncontained_element() {
        assert_eq!(index().storey_name(EntityId(24)), None);
        assert_eq!(index().storey_name(EntityId(6)), None);
    }
}
