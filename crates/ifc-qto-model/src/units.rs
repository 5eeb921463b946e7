// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit descriptors declared by a model's unit assignment

use serde::{Deserialize, Serialize};

/// How a unit is defined in the document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    /// IfcSIUnit, optionally prefixed
    Si,
    /// IfcConversionBasedUnit (foot, inch, ...)
    ConversionBased,
    /// IfcContextDependentUnit or any other named unit
    Named,
}

/// One entry of the project's unit assignment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    pub kind: UnitKind,
    /// Unit type enum without dots, e.g. `LENGTHUNIT`
    pub unit_type: String,
    /// SI prefix enum, e.g. `MILLI`
    pub prefix: Option<String>,
    /// Unit name, e.g. `METRE` or `FOOT`
    pub name: String,
    /// Meters per unit for conversion-based units, when resolvable
    pub conversion_factor: Option<f64>,
}

impl UnitDescriptor {
    /// SI unit descriptor
    pub fn si(unit_type: &str, prefix: Option<&str>, name: &str) -> Self {
        Self {
            kind: UnitKind::Si,
            unit_type: unit_type.to_string(),
            prefix: prefix.map(str::to_string),
            name: name.to_string(),
            conversion_factor: None,
        }
    }

    /// Conversion-based unit descriptor
    pub fn conversion(unit_type: &str, name: &str, factor: Option<f64>) -> Self {
        Self {
            kind: UnitKind::ConversionBased,
            unit_type: unit_type.to_string(),
            prefix: None,
            name: name.to_string(),
            conversion_factor: factor,
        }
    }

    /// Named unit descriptor
    pub fn named(unit_type: &str, name: &str) -> Self {
        Self {
            kind: UnitKind::Named,
            unit_type: unit_type.to_string(),
            prefix: None,
            name: name.to_string(),
            conversion_factor: None,
        }
    }

    /// True for length units
    pub fn is_length(&self) -> bool {
        self.unit_type.eq_ignore_ascii_case("LENGTHUNIT")
    }
}

/// Scale of an SI prefix (`MILLI` → 1e-3); `None` for an unrecognized prefix
pub fn si_prefix_scale(prefix: &str) -> Option<f64> {
    let scale = match prefix.trim_matches('.').to_ascii_uppercase().as_str() {
        "EXA" => 1e18,
        "PETA" => 1e15,
        "TERA" => 1e12,
        "GIGA" => 1e9,
        "MEGA" => 1e6,
        "KILO" => 1e3,
        "HECTO" => 1e2,
        "DECA" => 1e1,
        "DECI" => 1e-1,
        "CENTI" => 1e-2,
        "MILLI" => 1e-3,
        "MICRO" => 1e-6,
        "NANO" => 1e-9,
        "PICO" => 1e-12,
        "FEMTO" => 1e-15,
        "ATTO" => 1e-18,
        _ => return None,
    };
    Some(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_table() {
        assert_eq!(si_prefix_scale("MILLI"), Some(0.001));
        assert_eq!(si_prefix_scale(".CENTI."), Some(0.01));
        assert_eq!(si_prefix_scale("kilo"), Some(1000.0));
        assert_eq!(si_prefix_scale("HALF"), None);
    }

    #[test]
    fn test_length_detection() {
        assert!(UnitDescriptor::si("LENGTHUNIT", None, "METRE").is_length());
        assert!(!UnitDescriptor::si("AREAUNIT", None, "SQUARE_METRE").is_length());
    }
}
