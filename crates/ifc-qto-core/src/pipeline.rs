// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end take-off run

use crate::boq::{summarize, BoqAggregator, BoqLine, BoqSummary};
use crate::collect::ElementCollector;
use crate::config::{GroupBy, QtoConfig};
use crate::cost::{CostReport, RateTable};
use crate::error::Result;
use crate::extract::extract_batch;
use crate::lookup::storey_name;
use crate::quantity::QuantityResolver;
use crate::units::{unit_scale_of, UnitScale};
use ifc_qto_model::{Element, ElementSource};
use serde::{Deserialize, Serialize};

/// Identification of the processed model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub schema: String,
    pub file_path: Option<String>,
    pub project_name: Option<String>,
    pub project_id: Option<String>,
    pub building_name: Option<String>,
    pub building_id: Option<String>,
    /// Meters per native length unit
    pub unit_scale: f64,
    /// Native length unit label
    pub unit_label: String,
}

impl ProjectInfo {
    pub fn new(source: &dyn ElementSource, scale: &UnitScale, file_path: Option<String>) -> Self {
        let metadata = source.project_metadata();
        Self {
            schema: metadata.schema,
            file_path,
            project_name: metadata.project_name,
            project_id: metadata.project_id,
            building_name: metadata.building_name,
            building_id: metadata.building_id,
            unit_scale: scale.factor,
            unit_label: scale.label.clone(),
        }
    }
}

/// Everything a renderer needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QtoReport {
    pub project: ProjectInfo,
    pub grouping: GroupBy,
    pub boq: Vec<BoqLine>,
    pub summary: BoqSummary,
    /// Present when cost estimation was requested
    pub cost: Option<CostReport>,
}

impl QtoReport {
    pub fn is_empty(&self) -> bool {
        self.boq.is_empty()
    }
}

/// Settings of one run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: QtoConfig,
    /// Enables cost estimation
    pub rates: Option<RateTable>,
    /// Path shown in the project information
    pub file_path: Option<String>,
}

/// Run the take-off over a source
pub fn run(source: &dyn ElementSource, options: &RunOptions) -> Result<QtoReport> {
    let config = &options.config;

    log::info!("[1/5] Reading project information");
    let scale = unit_scale_of(source);
    let project = ProjectInfo::new(source, &scale, options.file_path.clone());
    log::info!(
        "Schema {}, length unit {} (scale {})",
        project.schema,
        scale.label,
        scale.factor
    );

    log::info!("[2/5] Collecting elements");
    let elements = ElementCollector::new(config).collect(source);
    if elements.is_empty() {
        log::warn!("No matching elements found");
    }

    log::info!("[3/5] Extracting quantities");
    let resolver = QuantityResolver::new(source, scale, config.linear_ifc_types())
        .with_type_names(config.declared_type_names());
    let storey_of = |element: &Element| -> Result<Option<String>> {
        Ok(storey_name(source, element.id))
    };
    let records = extract_batch(&resolver, &elements, Some(&storey_of));

    log::info!("[4/5] Generating bill of quantities (grouping: {})", config.grouping);
    let aggregator = BoqAggregator::new(config.grouping, config.priority.clone())
        .with_precision(config.precision);
    let boq = aggregator.aggregate(&records);
    let summary = summarize(&boq, config.precision);
    log_summary(&summary);

    let cost = match &options.rates {
        Some(rates) => {
            log::info!("[5/5] Estimating costs");
            Some(CostReport::build(&boq, rates))
        }
        None => {
            log::info!("[5/5] Cost estimation not requested");
            None
        }
    };

    Ok(QtoReport {
        project,
        grouping: config.grouping,
        boq,
        summary,
        cost,
    })
}

fn log_summary(summary: &BoqSummary) {
    log::info!("BOQ lines: {}", summary.total_items);
    if summary.total_volume_m3 > 0.0 {
        log::info!("Total volume: {:.3} m³", summary.total_volume_m3);
    }
    if summary.total_area_m2 > 0.0 {
        log::info!("Total area: {:.3} m²", summary.total_area_m2);
    }
    if summary.total_length_m > 0.0 {
        log::info!("Total length: {:.3} m", summary.total_length_m);
    }
    if summary.total_count > 0 {
        log::info!("Total count: {}", summary.total_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boq::UnitOfMeasure;
    use crate::test_support::{MockShape, MockSource};
    use crate::units::ASSUMED_SCALE;
    use ifc_qto_model::{IfcType, ProjectMetadata, QuantitySet, QuantityType, UnitDescriptor};

    fn source() -> MockSource {
        let mut source = MockSource::new();
        source.metadata = ProjectMetadata {
            schema: "IFC4".into(),
            project_name: Some("Depot".into()),
            ..Default::default()
        };
        for (id, volume) in [(1, 2.0), (2, 3.5), (3, 1.5)] {
            source.element(id, IfcType::IfcWall);
            source.qsets.insert(
                id,
                vec![QuantitySet::new("Qto_WallBaseQuantities").with(
                    "NetVolume",
                    volume,
                    QuantityType::Volume,
                )],
            );
            source.storeys.insert(id, "Ground".into());
            source.materials.insert(id, vec!["Concrete".into()]);
        }
        source.named(4, IfcType::IfcOpeningElement, "Opening");
        source.element(5, IfcType::IfcColumn);
        source.shapes.insert(
            5,
            MockShape {
                volume: Some(0.27),
                area: Some(4.0),
                bbox: None,
            },
        );
        source
    }

    #[test]
    fn test_run_without_cost() {
        let report = run(&source(), &RunOptions::default()).unwrap();
        assert_eq!(report.project.project_name.as_deref(), Some("Depot"));
        assert_eq!(report.project.unit_scale, 1.0);
        assert_eq!(report.boq.len(), 2);

        let column = &report.boq[0];
        assert_eq!(column.element_type, "IfcColumn");
        assert_eq!(column.quantity, 0.27);
        assert_eq!(column.storey, "Not Specified");

        let walls = &report.boq[1];
        assert_eq!(walls.unit, UnitOfMeasure::CubicMeter);
        assert_eq!(walls.quantity, 7.0);
        assert_eq!(walls.count, 3);
        assert_eq!(walls.description, "Wall - Concrete");
        assert_eq!(walls.storey, "Ground");

        assert_eq!(report.summary.total_count, 4);
        assert!(report.cost.is_none());
    }

    #[test]
    fn test_run_with_cost() {
        let options = RunOptions {
            rates: Some(RateTable::new().with_rate("IfcWall", "concrete", 100.0)),
            ..Default::default()
        };
        let report = run(&source(), &options).unwrap();
        let cost = report.cost.unwrap();
        assert_eq!(cost.grand_total, 700.0);
        assert_eq!(cost.by_storey["Ground"], 700.0);
        assert_eq!(cost.by_storey["Not Specified"], 0.0);
    }

    #[test]
    fn test_class_outside_known_types_keeps_schema_name() {
        let mut source = MockSource::new();
        source.element(10, IfcType::parse("IFCCHIMNEY"));
        source.qsets.insert(
            10,
            vec![QuantitySet::new("Qto_ChimneyBaseQuantities")
                .with("NetVolume", 1.0, QuantityType::Volume)
                .with("NetSideArea", 12.0, QuantityType::Area)],
        );
        source.materials.insert(10, vec!["Brick".into()]);

        let mut config = QtoConfig::default();
        config.element_types = vec!["IfcChimney".into()];
        config.priority.area.push("IfcChimney".into());
        let options = RunOptions {
            config,
            rates: Some(RateTable::new().with_rate("IfcChimney", "brick", 80.0)),
            ..Default::default()
        };

        let report = run(&source, &options).unwrap();
        let line = &report.boq[0];
        assert_eq!(line.element_type, "IfcChimney");
        assert_eq!(line.description, "Chimney - Brick");
        assert_eq!(line.unit, UnitOfMeasure::SquareMeter);
        assert_eq!(line.quantity, 12.0);
        assert_eq!(report.cost.unwrap().lines[0].rate, 80.0);
    }

    #[test]
    fn test_empty_source_gives_empty_report() {
        let mut source = MockSource::new();
        source.units = vec![UnitDescriptor::named("AREAUNIT", "SQUARE_METRE")];
        let report = run(&source, &RunOptions::default()).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.summary, BoqSummary::default());
        assert_eq!(report.project.unit_scale, ASSUMED_SCALE);
    }

    #[test]
    fn test_report_serializes() {
        let report = run(&source(), &RunOptions::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["boq"][1]["unit"], "m³");
        assert_eq!(json["grouping"], "type");
        assert!(json["cost"].is_null());
    }
}
