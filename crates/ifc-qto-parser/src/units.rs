// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit assignment extraction
//!
//! Reads the project's `IfcUnitAssignment` into [`UnitDescriptor`]s. Picking
//! the length scale out of them is left to the consumer.

use ifc_qto_model::{
    si_prefix_scale, AttributeValue, DecodedEntity, EntityResolver, IfcType, ParseError, Result,
    UnitDescriptor,
};

/// Units declared by the first IfcProject
///
/// Fails when the file has no project or the project has no unit
/// assignment; undecodable individual units are skipped.
pub fn unit_descriptors(resolver: &dyn EntityResolver) -> Result<Vec<UnitDescriptor>> {
    let project = resolver
        .entities_by_type(&IfcType::IfcProject)
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::other("No IfcProject in file"))?;

    // IfcProject: UnitsInContext at 8
    let assignment = project
        .get(8)
        .and_then(|attr| resolver.resolve_ref(attr))
        .ok_or(ParseError::MissingAttribute {
            entity: project.id,
            attribute: 8,
        })?;

    // IfcUnitAssignment: Units at 0
    let units = assignment
        .get(0)
        .map(|attr| resolver.resolve_ref_list(attr))
        .unwrap_or_default();

    Ok(units
        .iter()
        .filter_map(|unit| describe_unit(unit, resolver))
        .collect())
}

fn describe_unit(unit: &DecodedEntity, resolver: &dyn EntityResolver) -> Option<UnitDescriptor> {
    match unit.ifc_type {
        // IfcSIUnit(Dimensions, UnitType, Prefix, Name)
        IfcType::IfcSIUnit => Some(UnitDescriptor::si(
            unit.get_enum(1)?,
            unit.get_enum(2),
            unit.get_enum(3)?,
        )),
        // IfcConversionBasedUnit(Dimensions, UnitType, Name, ConversionFactor)
        IfcType::IfcConversionBasedUnit => Some(UnitDescriptor::conversion(
            unit.get_enum(1)?,
            unit.get_string(2)?,
            conversion_factor(unit, resolver),
        )),
        // IfcContextDependentUnit(Dimensions, UnitType, Name)
        IfcType::IfcContextDependentUnit => {
            Some(UnitDescriptor::named(unit.get_enum(1)?, unit.get_string(2)?))
        }
        _ => {
            log::debug!("Ignoring unit {} of type {}", unit.id, unit.ifc_type);
            None
        }
    }
}

/// SI scale of a conversion-based unit
///
/// IfcMeasureWithUnit(ValueComponent, UnitComponent); the unit component is
/// itself an SI or conversion-based unit and is resolved recursively.
fn conversion_factor(unit: &DecodedEntity, resolver: &dyn EntityResolver) -> Option<f64> {
    let measure = unit.get(3).and_then(|attr| resolver.resolve_ref(attr))?;
    if measure.ifc_type != IfcType::IfcMeasureWithUnit {
        return None;
    }

    let value = measure.get(0).and_then(AttributeValue::as_float)?;
    let base = measure.get(1).and_then(|attr| resolver.resolve_ref(attr));
    let base_scale = match base {
        Some(base) if base.ifc_type == IfcType::IfcSIUnit => {
            base.get_enum(2).and_then(si_prefix_scale).unwrap_or(1.0)
        }
        Some(base) if base.ifc_type == IfcType::IfcConversionBasedUnit && base.id != unit.id => {
            conversion_factor(&base, resolver).unwrap_or(1.0)
        }
        _ => 1.0,
    };

    Some(value * base_scale)
}
