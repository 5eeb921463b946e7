// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit rates and cost estimation
//!
//! Rate file layout:
//!
//! ```json
//! { "IfcWall": { "Concrete": 120.0, "Brick": 85.0, "default": 100.0 } }
//! ```
//!
//! Material keys match case-insensitively as substrings of the line's
//! material, in declared order.

use crate::boq::BoqLine;
use crate::error::{QtoError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

/// Key of the fallback rate of an element type
pub const DEFAULT_KEY: &str = "default";

/// Entry of the rate file before validation
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Rates(IndexMap<String, serde_json::Value>),
    Other(serde_json::Value),
}

/// Element type -> material key -> unit rate
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RateTable {
    rates: IndexMap<String, IndexMap<String, f64>>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion, keeps insertion order
    pub fn with_rate(mut self, element_type: &str, key: &str, rate: f64) -> Self {
        self.rates
            .entry(element_type.to_string())
            .or_default()
            .insert(key.to_string(), rate);
        self
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Parse a rate document
    ///
    /// Malformed JSON gives an empty table; malformed or negative entries
    /// are skipped.
    pub fn from_json_str(text: &str) -> Self {
        let raw: IndexMap<String, RawEntry> = match serde_json::from_str(text) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Malformed rate table, all rates are 0.0: {}", e);
                return Self::default();
            }
        };

        let mut rates = IndexMap::new();
        for (element_type, entry) in raw {
            let entries = match entry {
                RawEntry::Rates(entries) => entries,
                RawEntry::Other(value) => {
                    log::warn!(
                        "Skipping rates for {}: expected an object, got {}",
                        element_type,
                        value
                    );
                    continue;
                }
            };

            let mut type_rates = IndexMap::new();
            for (key, value) in entries {
                match value.as_f64() {
                    Some(rate) if rate.is_finite() && rate >= 0.0 => {
                        type_rates.insert(key, rate);
                    }
                    _ => log::warn!(
                        "Skipping rate {}/{}: {} is not a non-negative number",
                        element_type,
                        key,
                        value
                    ),
                }
            }
            rates.insert(element_type, type_rates);
        }

        Self { rates }
    }

    /// Load a rate file
    ///
    /// A missing file gives an empty table. Any other read failure is an
    /// error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("Rate file {} not found, all rates are 0.0", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(QtoError::RateFile {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let table = Self::from_json_str(&text);
        log::info!(
            "Loaded rates for {} element types from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Unit rate of an element type, refined by material
    pub fn rate(&self, element_type: &str, material: Option<&str>) -> f64 {
        let type_rates = self.rates.get(element_type).or_else(|| {
            self.rates
                .iter()
                .find(|(declared, _)| declared.eq_ignore_ascii_case(element_type))
                .map(|(_, rates)| rates)
        });
        let Some(type_rates) = type_rates.filter(|r| !r.is_empty()) else {
            return 0.0;
        };

        if let Some(material) = material.filter(|m| !m.is_empty()) {
            let material = material.to_lowercase();
            let matched = type_rates.iter().find(|(key, _)| {
                key.as_str() != DEFAULT_KEY && material.contains(key.to_lowercase().as_str())
            });
            if let Some((_, rate)) = matched {
                return *rate;
            }
        }

        type_rates.get(DEFAULT_KEY).copied().unwrap_or(0.0)
    }
}

/// BOQ line with its rate and cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLine {
    #[serde(flatten)]
    pub line: BoqLine,
    pub rate: f64,
    pub total_cost: f64,
}

/// Priced BOQ with rollups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub lines: Vec<PricedLine>,
    pub by_element_type: BTreeMap<String, f64>,
    pub by_storey: BTreeMap<String, f64>,
    pub grand_total: f64,
}

impl CostReport {
    /// Price every line and roll the costs up
    pub fn build(lines: &[BoqLine], rates: &RateTable) -> Self {
        let mut report = CostReport::default();

        for line in lines {
            let rate = rates.rate(&line.element_type, Some(&line.material));
            let total_cost = line.quantity * rate;

            *report
                .by_element_type
                .entry(line.element_type.clone())
                .or_default() += total_cost;
            *report.by_storey.entry(line.storey.clone()).or_default() += total_cost;
            report.grand_total += total_cost;

            report.lines.push(PricedLine {
                line: line.clone(),
                rate,
                total_cost,
            });
        }

        let unpriced = report.lines.iter().filter(|l| l.rate == 0.0).count();
        if unpriced > 0 {
            log::warn!("{} of {} lines have no rate", unpriced, report.lines.len());
        }
        log::info!("Estimated total cost {:.2}", report.grand_total);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boq::{UnitOfMeasure, NOT_SPECIFIED};
    use std::io::Write;

    fn table() -> RateTable {
        RateTable::from_json_str(
            r#"{
                "IfcWall": { "Concrete": 50, "default": 10 },
                "IfcSlab": { "concrete": 80, "Ready Mix": 95, "default": 70 }
            }"#,
        )
    }

    fn line(element_type: &str, material: &str, storey: &str, quantity: f64) -> BoqLine {
        BoqLine {
            item_no: 1,
            element_type: element_type.to_string(),
            description: element_type.to_string(),
            unit: UnitOfMeasure::CubicMeter,
            quantity,
            storey: storey.to_string(),
            material: material.to_string(),
            volume_m3: Some(quantity),
            area_m2: None,
            length_m: None,
            count: 1,
        }
    }

    #[test]
    fn test_rate_lookup() {
        let rates = table();
        assert_eq!(rates.rate("IfcWall", Some("Ready Mix Concrete Grade 30")), 50.0);
        assert_eq!(rates.rate("IfcWall", Some("Steel")), 10.0);
        assert_eq!(rates.rate("IfcWall", None), 10.0);
        assert_eq!(rates.rate("IfcBeam", Some("Concrete")), 0.0);
    }

    #[test]
    fn test_type_lookup_ignores_case() {
        let rates = RateTable::new().with_rate("IfcChimney", "brick", 80.0);
        assert_eq!(rates.rate("IFCCHIMNEY", Some("Brick")), 80.0);
        assert_eq!(rates.rate("IfcChimney", Some("Brick")), 80.0);
    }

    #[test]
    fn test_first_declared_match_wins() {
        // both keys match, "concrete" is declared first
        assert_eq!(table().rate("IfcSlab", Some("Ready Mix Concrete")), 80.0);
    }

    #[test]
    fn test_default_key_is_not_a_material() {
        let rates = RateTable::new().with_rate("IfcWall", "default", 10.0);
        assert_eq!(rates.rate("IfcWall", Some("default grey")), 10.0);
        let rates = RateTable::new().with_rate("IfcWall", "Brick", 30.0);
        assert_eq!(rates.rate("IfcWall", Some("Concrete")), 0.0);
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let rates = RateTable::from_json_str(
            r#"{
                "IfcWall": { "Concrete": -5, "Brick": "cheap", "default": 12.5 },
                "IfcSlab": 40,
                "IfcBeam": { "Steel": 300 }
            }"#,
        );
        assert_eq!(rates.len(), 2);
        assert_eq!(rates.rate("IfcWall", Some("Concrete")), 12.5);
        assert_eq!(rates.rate("IfcSlab", None), 0.0);
        assert_eq!(rates.rate("IfcBeam", Some("steel S355")), 300.0);
    }

    #[test]
    fn test_malformed_json_is_empty() {
        assert!(RateTable::from_json_str("{ not json").is_empty());
        assert!(RateTable::from_json_str("[1, 2]").is_empty());
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"IfcColumn": {{"default": 250}}}}"#).unwrap();
        let rates = RateTable::load(file.path()).unwrap();
        assert_eq!(rates.rate("IfcColumn", Some("Concrete")), 250.0);
    }

    #[test]
    fn test_missing_file_is_empty_but_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = RateTable::load(&dir.path().join("rates.json")).unwrap();
        assert!(missing.is_empty());
        assert!(matches!(
            RateTable::load(dir.path()),
            Err(QtoError::RateFile { .. })
        ));
    }

    #[test]
    fn test_cost_report_rollups() {
        let lines = vec![
            line("IfcSlab", "Concrete C30", "L1", 10.0),
            line("IfcWall", "Concrete", "L1", 2.0),
            line("IfcWall", NOT_SPECIFIED, "L2", 3.0),
            line("IfcBeam", "Steel", "L2", 1.0),
        ];
        let report = CostReport::build(&lines, &table());
        assert_eq!(report.lines[0].rate, 80.0);
        assert_eq!(report.lines[0].total_cost, 800.0);
        assert_eq!(report.lines[2].rate, 10.0);
        assert_eq!(report.lines[3].total_cost, 0.0);
        assert_eq!(report.by_element_type["IfcWall"], 130.0);
        assert_eq!(report.by_storey["L1"], 900.0);
        assert_eq!(report.by_storey["L2"], 30.0);
        assert_eq!(report.grand_total, 930.0);
        let keys: Vec<&String> = report.by_element_type.keys().collect();
        assert_eq!(keys, vec!["IfcBeam", "IfcSlab", "IfcWall"]);
    }
}
