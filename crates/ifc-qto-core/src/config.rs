// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Take-off configuration
//!
//! Defaults reproduce the standard civil take-off; a TOML file can replace
//! any section. Command line flags are applied on top by the binary.

use crate::error::{QtoError, Result};
use ifc_qto_model::IfcType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// BOQ grouping key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Element type
    #[default]
    Type,
    /// Containing storey
    Storey,
    /// Material
    Material,
    /// Element type, storey and material together
    #[serde(rename = "all")]
    Composite,
}

impl GroupBy {
    /// Command line spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Type => "type",
            GroupBy::Storey => "storey",
            GroupBy::Material => "material",
            GroupBy::Composite => "all",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            // "category" is the legacy environment default
            "type" | "category" => Ok(GroupBy::Type),
            "storey" => Ok(GroupBy::Storey),
            "material" => Ok(GroupBy::Material),
            "all" | "composite" => Ok(GroupBy::Composite),
            other => Err(format!(
                "unknown grouping '{}', expected type, storey, material or all",
                other
            )),
        }
    }
}

/// Which primary quantity an element type prefers
///
/// Checked in order volume, area, length; a type listed in a set only uses
/// that quantity when its summed value is positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityTable {
    pub volume: Vec<String>,
    pub area: Vec<String>,
    pub length: Vec<String>,
}

impl Default for PriorityTable {
    fn default() -> Self {
        let names = |types: &[&str]| types.iter().map(|t| t.to_string()).collect();
        Self {
            volume: names(&[
                "IfcWall",
                "IfcWallStandardCase",
                "IfcSlab",
                "IfcFooting",
                "IfcColumn",
                "IfcBeam",
            ]),
            area: names(&["IfcRoof", "IfcCurtainWall", "IfcRailing"]),
            length: names(&["IfcBeam", "IfcPile"]),
        }
    }
}

impl PriorityTable {
    pub fn prefers_volume(&self, base_type: &str) -> bool {
        self.volume.iter().any(|t| t.eq_ignore_ascii_case(base_type))
    }

    pub fn prefers_area(&self, base_type: &str) -> bool {
        self.area.iter().any(|t| t.eq_ignore_ascii_case(base_type))
    }

    pub fn prefers_length(&self, base_type: &str) -> bool {
        self.length.iter().any(|t| t.eq_ignore_ascii_case(base_type))
    }
}

/// Take-off settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QtoConfig {
    /// Classes to collect; known subtypes come along
    pub element_types: Vec<String>,
    /// Classes never taken off
    pub excluded_types: Vec<String>,
    /// Name or tag fragments marking non-physical elements
    pub excluded_keywords: Vec<String>,
    /// Classes whose length falls back to the longest bounding box side
    pub linear_types: Vec<String>,
    /// Decimal places of BOQ quantities
    pub precision: u32,
    pub grouping: GroupBy,
    pub priority: PriorityTable,
}

impl Default for QtoConfig {
    fn default() -> Self {
        let names = |types: &[&str]| types.iter().map(|t| t.to_string()).collect();
        Self {
            element_types: names(&["IfcBeam", "IfcColumn", "IfcSlab", "IfcWall", "IfcFooting"]),
            excluded_types: names(&[
                "IfcOpeningElement",
                "IfcSpace",
                "IfcAnnotation",
                "IfcGrid",
                "IfcOpeningStandardCase",
            ]),
            excluded_keywords: names(&["opening", "void", "annotation"]),
            linear_types: names(&["IfcBeam", "IfcColumn"]),
            precision: 3,
            grouping: GroupBy::Type,
            priority: PriorityTable::default(),
        }
    }
}

impl QtoConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: QtoConfig =
            toml::from_str(text).map_err(|e| QtoError::config("<string>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: QtoConfig = toml::from_str(&text)
            .map_err(|e| QtoError::config(path.display().to_string(), e.to_string()))?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject settings the pipeline cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.element_types.is_empty() {
            return Err(QtoError::config(
                "element_types",
                "at least one element type is required",
            ));
        }
        if self.precision > 9 {
            return Err(QtoError::config("precision", "must be between 0 and 9"));
        }
        Ok(())
    }

    /// Collected classes as IFC types
    pub fn element_ifc_types(&self) -> Vec<IfcType> {
        self.element_types.iter().map(|t| IfcType::parse(t)).collect()
    }

    /// Excluded classes as IFC types
    pub fn excluded_ifc_types(&self) -> Vec<IfcType> {
        self.excluded_types.iter().map(|t| IfcType::parse(t)).collect()
    }

    /// Every class name the configuration spells out
    pub fn declared_type_names(&self) -> Vec<String> {
        self.element_types
            .iter()
            .chain(&self.linear_types)
            .chain(&self.priority.volume)
            .chain(&self.priority.area)
            .chain(&self.priority.length)
            .cloned()
            .collect()
    }

    /// Linear member classes as IFC types
    pub fn linear_ifc_types(&self) -> Vec<IfcType> {
        self.linear_types.iter().map(|t| IfcType::parse(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QtoConfig::default();
        assert_eq!(config.precision, 3);
        assert_eq!(config.grouping, GroupBy::Type);
        assert_eq!(config.element_ifc_types()[0], IfcType::IfcBeam);
        assert!(config.priority.prefers_volume("IfcWallStandardCase"));
        assert!(config.priority.prefers_length("IfcBeam"));
        assert!(!config.priority.prefers_area("IfcWall"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = QtoConfig::from_toml(
            r#"
            element_types = ["IfcWall", "IfcRoof"]
            grouping = "all"

            [priority]
            area = ["IfcRoof", "IfcCovering"]
            "#,
        )
        .unwrap();
        assert_eq!(config.element_types, vec!["IfcWall", "IfcRoof"]);
        assert_eq!(config.grouping, GroupBy::Composite);
        assert!(config.priority.prefers_area("IfcCovering"));
        // untouched sections keep their defaults
        assert!(config.priority.prefers_volume("IfcSlab"));
        assert_eq!(config.precision, 3);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(QtoConfig::from_toml("precision = 12").is_err());
        assert!(QtoConfig::from_toml("element_types = []").is_err());
        assert!(QtoConfig::from_toml("grouping = \"floor\"").is_err());
    }

    #[test]
    fn test_group_by_names() {
        assert_eq!("type".parse::<GroupBy>().unwrap(), GroupBy::Type);
        assert_eq!("Storey".parse::<GroupBy>().unwrap(), GroupBy::Storey);
        assert_eq!("all".parse::<GroupBy>().unwrap(), GroupBy::Composite);
        assert_eq!("category".parse::<GroupBy>().unwrap(), GroupBy::Type);
        assert!("floor".parse::<GroupBy>().is_err());
        assert_eq!(GroupBy::Composite.to_string(), "all");
    }
}
