// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bill of quantities aggregation
//!
//! Records are partitioned by the grouping key, summed, given one primary
//! quantity each, sorted by element type and storey and numbered from 1.

use crate::config::{GroupBy, PriorityTable};
use crate::quantity::QuantityRecord;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Group key standing in for a missing storey or material
pub const UNKNOWN: &str = "Unknown";

/// Displayed storey or material when the group has none
pub const NOT_SPECIFIED: &str = "Not Specified";

/// Unit of the primary quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    #[serde(rename = "m³")]
    CubicMeter,
    #[serde(rename = "m²")]
    SquareMeter,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "No.")]
    Number,
}

impl UnitOfMeasure {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnitOfMeasure::CubicMeter => "m³",
            UnitOfMeasure::SquareMeter => "m²",
            UnitOfMeasure::Meter => "m",
            UnitOfMeasure::Number => "No.",
        }
    }
}

impl fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One BOQ row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoqLine {
    /// 1-based, valid once the table is numbered
    pub item_no: u32,
    pub element_type: String,
    pub description: String,
    pub unit: UnitOfMeasure,
    pub quantity: f64,
    pub storey: String,
    pub material: String,
    pub volume_m3: Option<f64>,
    pub area_m2: Option<f64>,
    pub length_m: Option<f64>,
    pub count: u64,
}

/// Totals over a finished BOQ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoqSummary {
    pub total_items: usize,
    pub total_volume_m3: f64,
    pub total_area_m2: f64,
    pub total_length_m: f64,
    pub total_count: u64,
    /// Distinct element types, first appearance first
    pub element_types: Vec<String>,
}

/// Round half away from zero to `precision` decimals
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Class name without the `Ifc` prefix
pub fn display_type(element_type: &str) -> &str {
    match element_type.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("ifc") => &element_type[3..],
        _ => element_type,
    }
}

/// Line description, e.g. `Wall - Concrete`
pub fn describe(element_type: &str, material: &str) -> String {
    let type_name = display_type(element_type);
    if material.is_empty() || material == UNKNOWN || material == NOT_SPECIFIED {
        type_name.to_string()
    } else {
        format!("{} - {}", type_name, material)
    }
}

/// Identity of a BOQ line under the active grouping
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Type(String),
    Storey(String),
    Material(String),
    Composite {
        element_type: String,
        storey: String,
        material: String,
    },
}

/// Partitions records into BOQ lines
#[derive(Debug, Clone)]
pub struct BoqAggregator {
    group_by: GroupBy,
    priority: PriorityTable,
    precision: u32,
}

impl BoqAggregator {
    pub fn new(group_by: GroupBy, priority: PriorityTable) -> Self {
        Self {
            group_by,
            priority,
            precision: 3,
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn group_by(&self) -> GroupBy {
        self.group_by
    }

    /// Grouping key of a record; missing storey or material read [`UNKNOWN`]
    pub fn group_key(&self, record: &QuantityRecord) -> GroupKey {
        let storey = || record.storey.clone().unwrap_or_else(|| UNKNOWN.to_string());
        let material = || record.material.clone().unwrap_or_else(|| UNKNOWN.to_string());
        match self.group_by {
            GroupBy::Type => GroupKey::Type(record.element_type.clone()),
            GroupBy::Storey => GroupKey::Storey(storey()),
            GroupBy::Material => GroupKey::Material(material()),
            GroupBy::Composite => GroupKey::Composite {
                element_type: record.element_type.clone(),
                storey: storey(),
                material: material(),
            },
        }
    }

    /// Build the sorted, numbered BOQ
    pub fn aggregate(&self, records: &[QuantityRecord]) -> Vec<BoqLine> {
        if records.is_empty() {
            log::warn!("No quantity records, BOQ is empty");
            return Vec::new();
        }

        let mut groups: IndexMap<GroupKey, Vec<&QuantityRecord>> = IndexMap::new();
        for record in records {
            groups.entry(self.group_key(record)).or_default().push(record);
        }

        let mut lines: Vec<BoqLine> = groups
            .iter()
            .map(|(key, members)| self.build_line(key, members))
            .collect();

        // stable, so equal keys keep first-occurrence order
        lines.sort_by(|a, b| {
            a.element_type
                .cmp(&b.element_type)
                .then_with(|| a.storey.cmp(&b.storey))
        });
        number_lines(&mut lines);

        log::info!(
            "Generated BOQ with {} lines from {} records (grouping: {})",
            lines.len(),
            records.len(),
            self.group_by
        );
        lines
    }

    fn build_line(&self, key: &GroupKey, members: &[&QuantityRecord]) -> BoqLine {
        let first = members[0];
        let (element_type, storey, material) = match key {
            GroupKey::Composite {
                element_type,
                storey,
                material,
            } => (element_type.clone(), storey.clone(), material.clone()),
            _ => {
                let storey = match key {
                    GroupKey::Storey(storey) => storey.as_str(),
                    _ => first.storey.as_deref().unwrap_or(NOT_SPECIFIED),
                };
                let storey = if storey == UNKNOWN { NOT_SPECIFIED } else { storey };
                (
                    first.element_type.clone(),
                    storey.to_string(),
                    first
                        .material
                        .clone()
                        .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
                )
            }
        };

        let volume: f64 = members.iter().filter_map(|r| r.volume).sum();
        let area: f64 = members.iter().filter_map(|r| r.area).sum();
        let length: f64 = members.iter().filter_map(|r| r.length).sum();
        let count: u64 = members.iter().map(|r| u64::from(r.count)).sum();

        let (unit, quantity) = self.primary_quantity(&element_type, volume, area, length, count);
        let auxiliary = |total: f64| (total > 0.0).then(|| round_to(total, self.precision));

        BoqLine {
            item_no: 0,
            description: describe(&element_type, &material),
            element_type,
            unit,
            quantity: round_to(quantity, self.precision),
            storey,
            material,
            volume_m3: auxiliary(volume),
            area_m2: auxiliary(area),
            length_m: auxiliary(length),
            count,
        }
    }

    /// Pick the line's primary unit and quantity
    ///
    /// The priority table is consulted with the class name before any `_`
    /// suffix; without a preference the first positive of volume, area and
    /// length wins, and the element count is the last resort.
    pub fn primary_quantity(
        &self,
        element_type: &str,
        volume: f64,
        area: f64,
        length: f64,
        count: u64,
    ) -> (UnitOfMeasure, f64) {
        let base = element_type.split('_').next().unwrap_or(element_type);
        if self.priority.prefers_volume(base) && volume > 0.0 {
            (UnitOfMeasure::CubicMeter, volume)
        } else if self.priority.prefers_area(base) && area > 0.0 {
            (UnitOfMeasure::SquareMeter, area)
        } else if self.priority.prefers_length(base) && length > 0.0 {
            (UnitOfMeasure::Meter, length)
        } else if volume > 0.0 {
            (UnitOfMeasure::CubicMeter, volume)
        } else if area > 0.0 {
            (UnitOfMeasure::SquareMeter, area)
        } else if length > 0.0 {
            (UnitOfMeasure::Meter, length)
        } else {
            (UnitOfMeasure::Number, count as f64)
        }
    }
}

/// Assign item numbers 1..=N in the current order
pub fn number_lines(lines: &mut [BoqLine]) {
    for (index, line) in lines.iter_mut().enumerate() {
        line.item_no = index as u32 + 1;
    }
}

/// Summarize a finished BOQ
pub fn summarize(lines: &[BoqLine], precision: u32) -> BoqSummary {
    let mut element_types: Vec<String> = Vec::new();
    for line in lines {
        if !element_types.contains(&line.element_type) {
            element_types.push(line.element_type.clone());
        }
    }

    let total = |field: fn(&BoqLine) -> Option<f64>| {
        round_to(lines.iter().filter_map(field).sum(), precision)
    };

    BoqSummary {
        total_items: lines.len(),
        total_volume_m3: total(|l| l.volume_m3),
        total_area_m2: total(|l| l.area_m2),
        total_length_m: total(|l| l.length_m),
        total_count: lines.iter().map(|l| l.count).sum(),
        element_types,
    }
}
