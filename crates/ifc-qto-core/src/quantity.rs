// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-element quantity resolution
//!
//! Volume, area and length are filled by three tiers in order, each tier
//! only filling what is still absent:
//!
//! 1. quantity sets (`IfcElementQuantity`), by quantity name then by kind
//! 2. property sets whose name marks them as quantities (`Qto`, `Quantities`)
//! 3. measured geometry, only when the first two found nothing at all
//!
//! Raw values stay in file units until the record is built; the length
//! scale is applied once at that point.

use crate::error::{QtoError, Result};
use crate::lookup::first_material;
use crate::units::UnitScale;
use ifc_qto_model::{
    Element, ElementSource, EntityId, IfcType, PropertySet, QuantitySet, QuantityType,
    ShapeGeometry,
};
use serde::{Deserialize, Serialize};

/// Which measure a quantity name feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Volume,
    Area,
    Length,
}

/// Quantity name -> measure
const NAME_TABLE: &[(&str, Measure)] = &[
    ("NetVolume", Measure::Volume),
    ("GrossVolume", Measure::Volume),
    ("Volume", Measure::Volume),
    ("NetArea", Measure::Area),
    ("GrossArea", Measure::Area),
    ("Area", Measure::Area),
    ("NetSideArea", Measure::Area),
    ("TotalSurfaceArea", Measure::Area),
    ("Length", Measure::Length),
    ("NetLength", Measure::Length),
    ("GrossLength", Measure::Length),
    ("Perimeter", Measure::Length),
    ("Width", Measure::Length),
    ("Height", Measure::Length),
    ("Depth", Measure::Length),
];

/// Measure fed by a quantity or property name
pub fn measure_for_name(name: &str) -> Option<Measure> {
    NAME_TABLE
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, measure)| *measure)
}

/// Tier that supplied a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    QuantitySet,
    PropertySet,
    Geometry,
}

/// Provenance of each measure of a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureSources {
    pub volume: Option<Provenance>,
    pub area: Option<Provenance>,
    pub length: Option<Provenance>,
}

/// Measures found by one tier, in file units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialQuantities {
    pub volume: Option<f64>,
    pub area: Option<f64>,
    pub length: Option<f64>,
}

impl PartialQuantities {
    pub fn get(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Volume => self.volume,
            Measure::Area => self.area,
            Measure::Length => self.length,
        }
    }

    fn slot(&mut self, measure: Measure) -> &mut Option<f64> {
        match measure {
            Measure::Volume => &mut self.volume,
            Measure::Area => &mut self.area,
            Measure::Length => &mut self.length,
        }
    }

    /// Keep the first valid value offered for a measure
    pub fn offer(&mut self, measure: Measure, value: f64) {
        let slot = self.slot(measure);
        if slot.is_none() && is_valid(value) {
            *slot = Some(value);
        }
    }

    /// No measure known
    pub fn is_empty(&self) -> bool {
        self.volume.is_none() && self.area.is_none() && self.length.is_none()
    }

    /// Every measure known
    pub fn is_complete(&self) -> bool {
        self.volume.is_some() && self.area.is_some() && self.length.is_some()
    }

    /// Fill absent measures from a later tier, recording where they came from
    pub fn merge(&mut self, later: PartialQuantities, tier: Provenance, sources: &mut MeasureSources) {
        let targets = [
            (Measure::Volume, &mut sources.volume),
            (Measure::Area, &mut sources.area),
            (Measure::Length, &mut sources.length),
        ];
        for (measure, source) in targets {
            let slot = self.slot(measure);
            if slot.is_none() {
                if let Some(value) = later.get(measure) {
                    *slot = Some(value);
                    *source = Some(tier);
                }
            }
        }
    }
}

/// Finite and non-negative
pub fn is_valid(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Quantities of one element, in meters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityRecord {
    /// STEP entity id
    pub id: EntityId,
    pub global_id: Option<String>,
    /// Concrete class name, e.g. `IfcWallStandardCase`
    pub element_type: String,
    pub name: Option<String>,
    pub tag: Option<String>,
    pub predefined_type: Option<String>,
    /// m³
    pub volume: Option<f64>,
    /// m²
    pub area: Option<f64>,
    /// m
    pub length: Option<f64>,
    pub count: u32,
    pub material: Option<String>,
    pub storey: Option<String>,
    /// Class refined by predefined type, e.g. `IfcSlab_FLOOR`
    pub category: String,
    pub sources: MeasureSources,
}

/// Tier 1: quantity sets
///
/// Names from the table win. When no name matched anywhere, the first
/// quantity of each kind is used instead.
pub fn quantity_set_tier(qsets: &[QuantitySet]) -> PartialQuantities {
    let mut found = PartialQuantities::default();
    for quantity in qsets.iter().flat_map(|set| &set.quantities) {
        if let Some(measure) = measure_for_name(&quantity.name) {
            found.offer(measure, quantity.value);
        }
    }
    if !found.is_empty() {
        return found;
    }

    for quantity in qsets.iter().flat_map(|set| &set.quantities) {
        let measure = match quantity.quantity_type {
            QuantityType::Volume => Measure::Volume,
            QuantityType::Area => Measure::Area,
            QuantityType::Length => Measure::Length,
            _ => continue,
        };
        found.offer(measure, quantity.value);
    }
    found
}

/// True for property sets carrying quantities
pub fn is_quantity_pset(name: &str) -> bool {
    name.contains("Qto") || name.contains("Quantities")
}

/// Tier 2: quantity-like property sets
pub fn property_set_tier(psets: &[PropertySet]) -> PartialQuantities {
    let mut found = PartialQuantities::default();
    for pset in psets.iter().filter(|pset| is_quantity_pset(&pset.name)) {
        for property in &pset.properties {
            let (Some(measure), Some(value)) =
                (measure_for_name(&property.name), property.value.as_f64())
            else {
                continue;
            };
            found.offer(measure, value);
        }
    }
    found
}

/// Tier 3: measured geometry
///
/// Each measure fails on its own; non-positive results are absent. Linear
/// members take the longest bounding box side as their length.
pub fn geometry_tier(shape: &dyn ShapeGeometry, linear: bool, id: EntityId) -> PartialQuantities {
    let positive = |value: f64| (value.is_finite() && value > 0.0).then_some(value);
    let mut found = PartialQuantities::default();

    match shape.volume() {
        Ok(volume) => found.volume = positive(volume),
        Err(e) => log::debug!("No geometric volume for {}: {}", id, e),
    }
    match shape.surface_area() {
        Ok(area) => found.area = positive(area),
        Err(e) => log::debug!("No geometric area for {}: {}", id, e),
    }
    if linear {
        match shape.bounding_box() {
            Ok(bbox) => found.length = positive(bbox.longest_side()),
            Err(e) => log::debug!("No bounding box for {}: {}", id, e),
        }
    }
    found
}

/// Class name refined by the predefined type
pub fn category_key(element_type: &str, predefined_type: Option<&str>) -> String {
    match predefined_type {
        Some(predefined) if !predefined.is_empty() => format!("{}_{}", element_type, predefined),
        _ => element_type.to_string(),
    }
}

/// Builds [`QuantityRecord`]s from an element source
pub struct QuantityResolver<'a> {
    source: &'a dyn ElementSource,
    scale: UnitScale,
    linear_types: Vec<IfcType>,
    /// Declared spellings for classes the model only knows by STEP keyword
    type_names: Vec<String>,
}

impl<'a> QuantityResolver<'a> {
    pub fn new(source: &'a dyn ElementSource, scale: UnitScale, linear_types: Vec<IfcType>) -> Self {
        Self {
            source,
            scale,
            linear_types,
            type_names: Vec::new(),
        }
    }

    /// Schema spellings, e.g. `IfcChimney`, used to name classes outside
    /// [`IfcType`]'s known set
    pub fn with_type_names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.type_names = names.into_iter().collect();
        self
    }

    pub fn source(&self) -> &'a dyn ElementSource {
        self.source
    }

    pub fn scale(&self) -> &UnitScale {
        &self.scale
    }

    /// Class name as written in the schema
    ///
    /// Unknown classes only carry their upper-case keyword; a declared name
    /// equal to it ignoring case restores the schema spelling.
    pub fn type_name(&self, ifc_type: &IfcType) -> String {
        let name = ifc_type.name();
        match ifc_type {
            IfcType::Unknown(_) => self
                .type_names
                .iter()
                .find(|declared| declared.eq_ignore_ascii_case(name))
                .cloned()
                .unwrap_or_else(|| name.to_string()),
            _ => name.to_string(),
        }
    }

    fn is_linear(&self, ifc_type: &IfcType) -> bool {
        self.linear_types.iter().any(|linear| ifc_type.is_a(linear))
    }

    /// Resolve one element
    ///
    /// Only an element without id or class is an error; lookups that fail
    /// leave their measure absent.
    pub fn resolve(&self, element: &Element, storey: Option<String>) -> Result<QuantityRecord> {
        let element_type = self.type_name(&element.ifc_type);
        if element.id.0 == 0 {
            return Err(QtoError::invalid_element(element.id, "missing entity id"));
        }
        if element_type.is_empty() {
            return Err(QtoError::invalid_element(element.id, "missing element type"));
        }

        let id = element.id;
        let mut sources = MeasureSources::default();
        let mut raw = PartialQuantities::default();

        match self.source.quantity_sets(id) {
            Ok(qsets) => raw.merge(quantity_set_tier(&qsets), Provenance::QuantitySet, &mut sources),
            Err(e) => log::debug!("Quantity sets unavailable for {}: {}", id, e),
        }

        if !raw.is_complete() {
            match self.source.property_sets(id) {
                Ok(psets) => {
                    raw.merge(property_set_tier(&psets), Provenance::PropertySet, &mut sources)
                }
                Err(e) => log::debug!("Property sets unavailable for {}: {}", id, e),
            }
        }

        if raw.is_empty() {
            match self.source.shape(id) {
                Ok(Some(shape)) => raw.merge(
                    geometry_tier(shape.as_ref(), self.is_linear(&element.ifc_type), id),
                    Provenance::Geometry,
                    &mut sources,
                ),
                Ok(None) => log::debug!("{} has no measurable body", id),
                Err(e) => log::debug!("Geometry unavailable for {}: {}", id, e),
            }
        }

        Ok(QuantityRecord {
            id,
            global_id: element.global_id.clone(),
            category: category_key(&element_type, element.predefined_type.as_deref()),
            element_type,
            name: element.name.clone(),
            tag: element.tag.clone(),
            predefined_type: element.predefined_type.clone(),
            volume: raw.volume.map(|v| self.scale.volume(v)),
            area: raw.area.map(|a| self.scale.area(a)),
            length: raw.length.map(|l| self.scale.length(l)),
            count: 1,
            material: first_material(self.source, id),
            storey,
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockShape, MockSource};
    use ifc_qto_model::{BoundingBox, PropertyValue};

    fn resolver(source: &MockSource) -> QuantityResolver<'_> {
        QuantityResolver::new(source, UnitScale::meters(), vec![IfcType::IfcBeam, IfcType::IfcColumn])
    }

    fn cube_shape() -> MockShape {
        MockShape {
            volume: Some(8.0),
            area: Some(24.0),
            bbox: Some(BoundingBox::new([0.0; 3], [2.0, 2.0, 2.0])),
        }
    }

    #[test]
    fn test_quantity_set_wins_over_everything() {
        let mut source = MockSource::new();
        let wall = source.element(1, IfcType::IfcWall);
        source.qsets.insert(
            1,
            vec![QuantitySet::new("Qto_WallBaseQuantities")
                .with("NetVolume", 2.5, QuantityType::Volume)
                .with("GrossVolume", 3.0, QuantityType::Volume)],
        );
        source.psets.insert(
            1,
            vec![PropertySet::new("Qto_Revit").with("Volume", PropertyValue::Real(9.0))],
        );
        source.shapes.insert(1, cube_shape());

        let record = resolver(&source).resolve(&source.get_element(wall.0), None).unwrap();
        assert_eq!(record.volume, Some(2.5));
        assert_eq!(record.sources.volume, Some(Provenance::QuantitySet));
        assert_eq!(record.area, None);
    }

    #[test]
    fn test_property_sets_fill_gaps_only() {
        let mut source = MockSource::new();
        source.element(1, IfcType::IfcSlab);
        source.qsets.insert(
            1,
            vec![QuantitySet::new("BaseQuantities").with("NetArea", 12.0, QuantityType::Area)],
        );
        source.psets.insert(
            1,
            vec![
                PropertySet::new("Pset_SlabCommon").with("Volume", PropertyValue::Real(99.0)),
                PropertySet::new("PSet_Revit_Quantities")
                    .with("Area", PropertyValue::Real(50.0))
                    .with("Volume", PropertyValue::Text("3.6".into())),
            ],
        );

        let record = resolver(&source).resolve(&source.get_element(1), None).unwrap();
        assert_eq!(record.area, Some(12.0));
        assert_eq!(record.volume, Some(3.6));
        assert_eq!(record.sources.area, Some(Provenance::QuantitySet));
        assert_eq!(record.sources.volume, Some(Provenance::PropertySet));
    }

    #[test]
    fn test_quantity_kind_fallback() {
        let qsets = vec![QuantitySet::new("Custom")
            .with("Inhalt", 4.0, QuantityType::Volume)
            .with("Fläche", 7.0, QuantityType::Area)
            .with("Stück", 2.0, QuantityType::Count)];
        let found = quantity_set_tier(&qsets);
        assert_eq!(found.volume, Some(4.0));
        assert_eq!(found.area, Some(7.0));
        assert_eq!(found.length, None);

        // a name match anywhere disables the kind fallback
        let qsets = vec![QuantitySet::new("Custom")
            .with("Inhalt", 4.0, QuantityType::Volume)
            .with("Length", 5.0, QuantityType::Length)];
        assert_eq!(quantity_set_tier(&qsets).volume, None);
    }

    #[test]
    fn test_invalid_values_are_skipped() {
        let qsets = vec![QuantitySet::new("Qto")
            .with("NetVolume", f64::NAN, QuantityType::Volume)
            .with("GrossVolume", -1.0, QuantityType::Volume)
            .with("Volume", 0.0, QuantityType::Volume)];
        assert_eq!(quantity_set_tier(&qsets).volume, Some(0.0));
    }

    #[test]
    fn test_geometry_fallback_for_linear_member() {
        let mut source = MockSource::new();
        source.element(1, IfcType::IfcBeamStandardCase);
        source.shapes.insert(
            1,
            MockShape {
                volume: Some(0.24),
                area: Some(0.0),
                bbox: Some(BoundingBox::new([0.0; 3], [6.0, 0.2, 0.2])),
            },
        );

        let record = resolver(&source).resolve(&source.get_element(1), None).unwrap();
        assert_eq!(record.volume, Some(0.24));
        assert_eq!(record.area, None);
        assert_eq!(record.length, Some(6.0));
        assert_eq!(record.sources.length, Some(Provenance::Geometry));
    }

    #[test]
    fn test_geometry_skipped_when_any_measure_known() {
        let mut source = MockSource::new();
        source.element(1, IfcType::IfcColumn);
        source.qsets.insert(
            1,
            vec![QuantitySet::new("Qto_ColumnBaseQuantities").with("Length", 3.0, QuantityType::Length)],
        );
        source.shapes.insert(1, cube_shape());

        let record = resolver(&source).resolve(&source.get_element(1), None).unwrap();
        assert_eq!(record.length, Some(3.0));
        assert_eq!(record.volume, None);
    }

    #[test]
    fn test_geometry_failures_stay_local() {
        let shape = MockShape {
            volume: None,
            area: Some(5.0),
            bbox: None,
        };
        let found = geometry_tier(&shape, true, EntityId(1));
        assert_eq!(found.volume, None);
        assert_eq!(found.area, Some(5.0));
        assert_eq!(found.length, None);
    }

    #[test]
    fn test_scale_applied_once_per_dimension() {
        let mut source = MockSource::new();
        source.element(1, IfcType::IfcWall);
        source.qsets.insert(
            1,
            vec![QuantitySet::new("Qto_WallBaseQuantities")
                .with("NetVolume", 2.0e9, QuantityType::Volume)
                .with("NetSideArea", 3.0e6, QuantityType::Area)
                .with("Length", 4000.0, QuantityType::Length)],
        );
        let resolver = QuantityResolver::new(&source, UnitScale::assumed(), Vec::new());

        let record = resolver.resolve(&source.get_element(1), None).unwrap();
        assert!((record.volume.unwrap() - 2.0).abs() < 1e-9);
        assert!((record.area.unwrap() - 3.0).abs() < 1e-9);
        assert!((record.length.unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_without_any_data() {
        let mut source = MockSource::new();
        let mut element = Element::new(EntityId(7), IfcType::IfcFooting);
        element.predefined_type = Some("PAD_FOOTING".into());
        element.name = Some("F1".into());
        source.elements.push(element.clone());
        source.materials.insert(7, vec!["Concrete C25/30".into()]);

        let record = resolver(&source)
            .resolve(&element, Some("Foundation".into()))
            .unwrap();
        assert_eq!((record.volume, record.area, record.length), (None, None, None));
        assert_eq!(record.count, 1);
        assert_eq!(record.category, "IfcFooting_PAD_FOOTING");
        assert_eq!(record.material.as_deref(), Some("Concrete C25/30"));
        assert_eq!(record.storey.as_deref(), Some("Foundation"));
        assert_eq!(record.sources, MeasureSources::default());
    }

    #[test]
    fn test_broken_lookups_do_not_fail_the_element() {
        let mut source = MockSource::new();
        source.element(1, IfcType::IfcWall);
        source.broken.push(1);
        let record = resolver(&source).resolve(&source.get_element(1), None).unwrap();
        assert_eq!(record.volume, None);
        assert_eq!(record.material, None);
    }

    #[test]
    fn test_element_without_identity_is_rejected() {
        let source = MockSource::new();
        let resolver = resolver(&source);
        let no_id = Element::new(EntityId(0), IfcType::IfcWall);
        let no_type = Element::new(EntityId(3), IfcType::Unknown(String::new()));
        assert!(matches!(
            resolver.resolve(&no_id, None),
            Err(QtoError::InvalidElement { .. })
        ));
        assert!(resolver.resolve(&no_type, None).is_err());
    }

    #[test]
    fn test_unknown_class_takes_declared_spelling() {
        let mut source = MockSource::new();
        source.element(7, IfcType::parse("IfcChimney"));
        let element = source.get_element(7);

        let plain = QuantityResolver::new(&source, UnitScale::meters(), Vec::new());
        assert_eq!(plain.resolve(&element, None).unwrap().element_type, "IFCCHIMNEY");

        let named = plain.with_type_names(["IfcWall".to_string(), "IfcChimney".to_string()]);
        let record = named.resolve(&element, None).unwrap();
        assert_eq!(record.element_type, "IfcChimney");
        assert_eq!(named.type_name(&IfcType::IfcWallStandardCase), "IfcWallStandardCase");
    }

    #[test]
    fn test_category_key() {
        assert_eq!(category_key("IfcSlab", Some("FLOOR")), "IfcSlab_FLOOR");
        assert_eq!(category_key("IfcSlab", Some("NOTDEFINED")), "IfcSlab_NOTDEFINED");
        assert_eq!(category_key("IfcWall", None), "IfcWall");
    }
}
