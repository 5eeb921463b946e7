// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length unit normalization
//!
//! Collapses the project's unit assignment into one factor converting the
//! native length unit to meters. Areas and volumes use its square and cube.

use ifc_qto_model::{si_prefix_scale, ElementSource, UnitDescriptor, UnitKind};
use serde::{Deserialize, Serialize};

/// Factor used when the file declares no usable length unit
pub const ASSUMED_SCALE: f64 = 0.001;

/// How the scale factor was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleSource {
    /// SI length unit with or without prefix
    SiUnit,
    /// Named unit spelling out meters
    NamedUnit,
    /// Conversion-based unit with an explicit factor
    ConversionFactor,
    /// Nothing usable, millimeters assumed
    Assumed,
}

/// Native length unit expressed in meters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitScale {
    /// Meters per native length unit
    pub factor: f64,
    /// Display label of the native unit (`m`, `mm`, `foot`, ...)
    pub label: String,
    pub source: ScaleSource,
}

impl UnitScale {
    fn new(factor: f64, label: impl Into<String>, source: ScaleSource) -> Self {
        Self {
            factor,
            label: label.into(),
            source,
        }
    }

    /// Millimeters, used when nothing else resolves
    pub fn assumed() -> Self {
        Self::new(ASSUMED_SCALE, "mm", ScaleSource::Assumed)
    }

    /// Meters, no conversion
    pub fn meters() -> Self {
        Self::new(1.0, "m", ScaleSource::SiUnit)
    }

    pub fn length(&self, value: f64) -> f64 {
        value * self.factor
    }

    pub fn area(&self, value: f64) -> f64 {
        value * self.factor * self.factor
    }

    pub fn volume(&self, value: f64) -> f64 {
        value * self.factor * self.factor * self.factor
    }
}

impl Default for UnitScale {
    fn default() -> Self {
        Self::assumed()
    }
}

/// Resolve the length scale from unit descriptors
///
/// Tries an SI length unit first, then a named unit spelling out meters,
/// then a conversion-based unit with a factor. Falls back to millimeters.
pub fn resolve_unit_scale(units: &[UnitDescriptor]) -> UnitScale {
    let lengths: Vec<&UnitDescriptor> = units.iter().filter(|u| u.is_length()).collect();

    let resolved = lengths
        .iter()
        .find_map(|u| si_scale(u))
        .or_else(|| lengths.iter().find_map(|u| named_meter_scale(u)))
        .or_else(|| lengths.iter().find_map(|u| conversion_scale(u)));

    match resolved {
        Some(scale) => {
            log::debug!("Length unit {} ({} m)", scale.label, scale.factor);
            scale
        }
        None => {
            log::warn!(
                "No usable length unit declared, assuming millimeters (scale {})",
                ASSUMED_SCALE
            );
            UnitScale::assumed()
        }
    }
}

/// Resolve the length scale straight from a source; unreadable unit
/// metadata counts as no metadata
pub fn unit_scale_of(source: &dyn ElementSource) -> UnitScale {
    match source.unit_metadata() {
        Ok(units) => resolve_unit_scale(&units),
        Err(e) => {
            log::warn!("Cannot read unit assignment: {}", e);
            resolve_unit_scale(&[])
        }
    }
}

fn si_scale(unit: &UnitDescriptor) -> Option<UnitScale> {
    if unit.kind != UnitKind::Si || !is_meter_name(&unit.name) {
        return None;
    }
    match unit.prefix.as_deref() {
        None => Some(UnitScale::meters()),
        Some(prefix) => {
            let factor = si_prefix_scale(prefix)?;
            Some(UnitScale::new(factor, prefixed_label(prefix), ScaleSource::SiUnit))
        }
    }
}

fn named_meter_scale(unit: &UnitDescriptor) -> Option<UnitScale> {
    if unit.kind == UnitKind::Si || !is_meter_name(&unit.name) {
        return None;
    }
    let name = unit.name.to_ascii_uppercase();
    let scale = if name.contains("MILLI") {
        UnitScale::new(0.001, "mm", ScaleSource::NamedUnit)
    } else if name.contains("CENTI") {
        UnitScale::new(0.01, "cm", ScaleSource::NamedUnit)
    } else {
        UnitScale::new(1.0, "m", ScaleSource::NamedUnit)
    };
    Some(scale)
}

fn conversion_scale(unit: &UnitDescriptor) -> Option<UnitScale> {
    if unit.kind != UnitKind::ConversionBased {
        return None;
    }
    let factor = unit.conversion_factor.filter(|f| f.is_finite() && *f > 0.0)?;
    Some(UnitScale::new(
        factor,
        unit.name.to_ascii_lowercase(),
        ScaleSource::ConversionFactor,
    ))
}

fn is_meter_name(name: &str) -> bool {
    let name = name.to_ascii_uppercase();
    name.contains("METRE") || name.contains("METER")
}

fn prefixed_label(prefix: &str) -> String {
    let symbol = match prefix.trim_matches('.').to_ascii_uppercase().as_str() {
        "MILLI" => "m",
        "CENTI" => "c",
        "DECI" => "d",
        "KILO" => "k",
        "HECTO" => "h",
        "DECA" => "da",
        "MICRO" => "\u{b5}",
        "NANO" => "n",
        other => return format!("{} metre", other.to_ascii_lowercase()),
    };
    format!("{}m", symbol)
}
