// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property sets and quantity sets attached to elements

use serde::{Deserialize, Serialize};

/// Value of a single property
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl PropertyValue {
    /// Numeric reading of the value; text is accepted when it parses as a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Real(v) => Some(*v),
            PropertyValue::Integer(v) => Some(*v as f64),
            PropertyValue::Boolean(_) => None,
            PropertyValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

/// A single named property
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Property value
    pub value: PropertyValue,
}

impl Property {
    /// Create a new property
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A property set containing multiple properties
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySet {
    /// Property set name (e.g., "Pset_WallCommon")
    pub name: String,
    /// Properties in this set
    pub properties: Vec<Property>,
}

impl PropertySet {
    /// Create a new property set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Builder-style insertion
    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.push(Property::new(name, value));
        self
    }

    /// Get a property by name
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Quantity kinds defined by the IFC quantity entities
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityType {
    /// Linear measurement (IfcQuantityLength)
    Length,
    /// Area measurement (IfcQuantityArea)
    Area,
    /// Volume measurement (IfcQuantityVolume)
    Volume,
    /// Count (IfcQuantityCount)
    Count,
    /// Weight/mass measurement (IfcQuantityWeight)
    Weight,
    /// Time measurement (IfcQuantityTime)
    Time,
}

/// A quantity value with its kind, in file units
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Quantity name
    pub name: String,
    /// Numeric value
    pub value: f64,
    /// Type of quantity
    pub quantity_type: QuantityType,
}

impl Quantity {
    /// Create a new quantity
    pub fn new(name: impl Into<String>, value: f64, quantity_type: QuantityType) -> Self {
        Self {
            name: name.into(),
            value,
            quantity_type,
        }
    }
}

/// A named quantity set (IfcElementQuantity), e.g. "Qto_WallBaseQuantities"
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantitySet {
    pub name: String,
    pub quantities: Vec<Quantity>,
}

impl QuantitySet {
    /// Create an empty quantity set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantities: Vec::new(),
        }
    }

    /// Builder-style insertion
    pub fn with(mut self, name: impl Into<String>, value: f64, kind: QuantityType) -> Self {
        self.quantities.push(Quantity::new(name, value, kind));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_reading() {
        assert_eq!(PropertyValue::Real(1.5).as_f64(), Some(1.5));
        assert_eq!(PropertyValue::Integer(4).as_f64(), Some(4.0));
        assert_eq!(PropertyValue::Text(" 12.25 ".into()).as_f64(), Some(12.25));
        assert_eq!(PropertyValue::Text("n/a".into()).as_f64(), None);
        assert_eq!(PropertyValue::Boolean(true).as_f64(), None);
    }

    #[test]
    fn test_property_lookup() {
        let pset = PropertySet::new("BaseQuantities")
            .with("NetVolume", PropertyValue::Real(2.0))
            .with("Reference", PropertyValue::Text("W1".into()));
        assert_eq!(pset.get("NetVolume").map(|p| &p.value), Some(&PropertyValue::Real(2.0)));
        assert!(pset.get("GrossVolume").is_none());
    }
}
