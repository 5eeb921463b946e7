// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Workbook export
//!
//! Sheet layout:
//!
//! - one BOQ sheet per element type, items numbered from 1 on each sheet,
//!   or a "No Data" sheet when the BOQ is empty
//! - "Summary" (Metric / Value)
//! - "Project Information" (Property / Value)
//! - "Cost Estimation" when the report is priced

use anyhow::{anyhow, Context, Result};
use ifc_qto_core::{BoqLine, CostReport, QtoReport};
use std::path::Path;
use umya_spreadsheet::{Spreadsheet, Worksheet};

pub const SUMMARY_SHEET: &str = "Summary";
pub const PROJECT_SHEET: &str = "Project Information";
pub const NO_DATA_SHEET: &str = "No Data";
pub const COST_SHEET: &str = "Cost Estimation";

pub const NO_DATA_MESSAGE: &str = "No data found in IFC file. Please check the file contains \
civil engineering elements (Beam, Column, Slab, Wall, Footing).";

/// Excel limit on sheet name length
const MAX_SHEET_NAME: usize = 31;
const MAX_COLUMN_WIDTH: usize = 50;

const BOQ_HEADERS: &[&str] = &[
    "Item No",
    "Element Type",
    "Description",
    "Unit",
    "Quantity",
    "Storey",
    "Material",
    "Volume (m³)",
    "Area (m²)",
    "Length (m)",
    "Count",
];
const COST_HEADERS: &[&str] = &["Rate", "Total Cost"];

const QUANTITY_FORMAT: &str = "0.000";
const CURRENCY_FORMAT: &str = "#,##0.00";

/// Sheet name without the `Ifc` prefix and characters Excel rejects
pub fn clean_sheet_name(name: &str) -> String {
    let stripped = name.strip_prefix("Ifc").unwrap_or(name);
    let cleaned: String = stripped
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '*' | '[' | ']' | ':' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

/// Spreadsheet column letters for a 1-based index
pub fn column_letter(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = ((column - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn cell_ref(column: u32, row: u32) -> String {
    format!("{}{}", column_letter(column), row)
}

/// A BOQ row with its optional rate and cost
struct Row<'a> {
    line: &'a BoqLine,
    priced: Option<(f64, f64)>,
}

fn rows(report: &QtoReport) -> Vec<Row<'_>> {
    match &report.cost {
        Some(cost) => cost
            .lines
            .iter()
            .map(|priced| Row {
                line: &priced.line,
                priced: Some((priced.rate, priced.total_cost)),
            })
            .collect(),
        None => report
            .boq
            .iter()
            .map(|line| Row { line, priced: None })
            .collect(),
    }
}

/// Sheet writer tracking column widths
struct SheetWriter<'a> {
    sheet: &'a mut Worksheet,
    widths: Vec<usize>,
}

impl<'a> SheetWriter<'a> {
    fn new(sheet: &'a mut Worksheet) -> Self {
        Self {
            sheet,
            widths: Vec::new(),
        }
    }

    fn track(&mut self, column: u32, len: usize) {
        let index = column as usize - 1;
        if self.widths.len() <= index {
            self.widths.resize(index + 1, 0);
        }
        self.widths[index] = self.widths[index].max(len);
    }

    fn header(&mut self, headers: &[&str]) {
        for (index, title) in headers.iter().enumerate() {
            let column = index as u32 + 1;
            let cell = self.sheet.get_cell_mut(cell_ref(column, 1).as_str());
            cell.set_value(*title);
            cell.get_style_mut().get_font_mut().set_bold(true);
            self.track(column, title.chars().count());
        }
    }

    fn text(&mut self, column: u32, row: u32, value: &str) {
        self.sheet
            .get_cell_mut(cell_ref(column, row).as_str())
            .set_value(value);
        self.track(column, value.chars().count());
    }

    fn number(&mut self, column: u32, row: u32, value: f64, format: Option<&str>) {
        let cell = self.sheet.get_cell_mut(cell_ref(column, row).as_str());
        cell.set_value_number(value);
        if let Some(format) = format {
            cell.get_style_mut()
                .get_number_format_mut()
                .set_format_code(format);
        }
        self.track(column, format!("{:.3}", value).len());
    }

    fn optional(&mut self, column: u32, row: u32, value: Option<f64>) {
        if let Some(value) = value {
            self.number(column, row, value, Some(QUANTITY_FORMAT));
        }
    }

    fn finish(self) {
        for (index, width) in self.widths.iter().enumerate() {
            let letter = column_letter(index as u32 + 1);
            self.sheet
                .get_column_dimension_mut(&letter)
                .set_width(((*width + 2).min(MAX_COLUMN_WIDTH)) as f64);
        }
    }
}

fn add_sheet<'b>(book: &'b mut Spreadsheet, name: &str) -> Result<&'b mut Worksheet> {
    book.new_sheet(name)
        .map_err(|e| anyhow!("failed to create sheet {}: {}", name, e))
}

/// Sheets written after the per-type sheets
const FIXED_SHEETS: [&str; 4] = [SUMMARY_SHEET, PROJECT_SHEET, COST_SHEET, NO_DATA_SHEET];

/// Sheet names compare case-insensitively in Excel
fn name_taken(book: &Spreadsheet, name: &str) -> bool {
    let lower = name.to_lowercase();
    FIXED_SHEETS.iter().any(|fixed| fixed.to_lowercase() == lower)
        || book
            .get_sheet_collection()
            .iter()
            .any(|sheet| sheet.get_name().to_lowercase() == lower)
}

/// Unique, cleaned sheet name
fn sheet_name_for(book: &Spreadsheet, element_type: &str) -> String {
    let base = clean_sheet_name(element_type);
    if !name_taken(book, &base) {
        return base;
    }
    let mut n = 2;
    loop {
        let suffix = format!(" ({})", n);
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        let candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        if !name_taken(book, &candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// One sheet per element type, in order of first appearance
fn write_boq_sheets(book: &mut Spreadsheet, report: &QtoReport) {
    let rows = rows(report);
    let priced = report.cost.is_some();

    let mut element_types: Vec<&str> = Vec::new();
    for row in &rows {
        if !element_types.contains(&row.line.element_type.as_str()) {
            element_types.push(&row.line.element_type);
        }
    }

    for element_type in element_types {
        let name = sheet_name_for(book, element_type);
        let sheet_rows: Vec<&Row<'_>> = rows
            .iter()
            .filter(|r| r.line.element_type == element_type)
            .collect();
        match write_boq_sheet(book, &name, &sheet_rows, priced) {
            Ok(()) => log::debug!("Wrote BOQ sheet {}", name),
            Err(e) => log::warn!("Skipping BOQ sheet {}: {:#}", name, e),
        }
    }
}

fn write_boq_sheet(
    book: &mut Spreadsheet,
    name: &str,
    rows: &[&Row<'_>],
    priced: bool,
) -> Result<()> {
    let mut writer = SheetWriter::new(add_sheet(book, name)?);
    if priced {
        writer.header(&[BOQ_HEADERS, COST_HEADERS].concat());
    } else {
        writer.header(BOQ_HEADERS);
    }

    for (index, row) in rows.iter().enumerate() {
        let line = row.line;
        let r = index as u32 + 2;
        writer.number(1, r, (index + 1) as f64, None);
        writer.text(2, r, &line.element_type);
        writer.text(3, r, &line.description);
        writer.text(4, r, line.unit.symbol());
        writer.number(5, r, line.quantity, Some(QUANTITY_FORMAT));
        writer.text(6, r, &line.storey);
        writer.text(7, r, &line.material);
        writer.optional(8, r, line.volume_m3);
        writer.optional(9, r, line.area_m2);
        writer.optional(10, r, line.length_m);
        writer.number(11, r, line.count as f64, None);
        if let Some((rate, total)) = row.priced {
            writer.number(12, r, rate, Some(CURRENCY_FORMAT));
            writer.number(13, r, total, Some(CURRENCY_FORMAT));
        }
    }
    writer.finish();
    Ok(())
}

fn write_no_data_sheet(book: &mut Spreadsheet) -> Result<()> {
    let mut writer = SheetWriter::new(add_sheet(book, NO_DATA_SHEET)?);
    writer.header(&["Message"]);
    writer.text(1, 2, NO_DATA_MESSAGE);
    writer.finish();
    Ok(())
}

fn write_summary_sheet(book: &mut Spreadsheet, report: &QtoReport) -> Result<()> {
    let summary = &report.summary;
    let mut writer = SheetWriter::new(add_sheet(book, SUMMARY_SHEET)?);
    writer.header(&["Metric", "Value"]);

    let metrics = [
        ("Total Items", summary.total_items as f64),
        ("Total Volume M3", summary.total_volume_m3),
        ("Total Area M2", summary.total_area_m2),
        ("Total Length M", summary.total_length_m),
        ("Total Count", summary.total_count as f64),
    ];
    let mut row = 2;
    for (metric, value) in metrics {
        writer.text(1, row, metric);
        writer.number(2, row, value, None);
        row += 1;
    }
    writer.text(1, row, "Element Types");
    writer.text(2, row, &summary.element_types.join(", "));
    writer.finish();
    Ok(())
}

fn write_project_sheet(book: &mut Spreadsheet, report: &QtoReport) -> Result<()> {
    let project = &report.project;
    let mut writer = SheetWriter::new(add_sheet(book, PROJECT_SHEET)?);
    writer.header(&["Property", "Value"]);

    let or_na = |value: &Option<String>| value.clone().unwrap_or_else(|| "N/A".to_string());
    let properties = [
        ("Schema", project.schema.clone()),
        ("File Path", or_na(&project.file_path)),
        ("Unit Scale Factor", project.unit_scale.to_string()),
        ("Base Unit", project.unit_label.clone()),
        ("Project Name", or_na(&project.project_name)),
        ("Project Id", or_na(&project.project_id)),
        ("Building Name", or_na(&project.building_name)),
        ("Building Id", or_na(&project.building_id)),
        ("Grouping", report.grouping.to_string()),
    ];
    for (index, (property, value)) in properties.iter().enumerate() {
        let row = index as u32 + 2;
        writer.text(1, row, property);
        writer.text(2, row, value);
    }
    writer.finish();
    Ok(())
}

fn write_cost_sheet(book: &mut Spreadsheet, cost: &CostReport) -> Result<()> {
    let mut writer = SheetWriter::new(add_sheet(book, COST_SHEET)?);
    writer.header(&["Category", "Total Cost"]);

    let mut row = 2;
    writer.text(1, row, "--- BY ELEMENT TYPE ---");
    for (element_type, total) in &cost.by_element_type {
        row += 1;
        writer.text(1, row, element_type);
        writer.number(2, row, *total, Some(CURRENCY_FORMAT));
    }
    row += 2;
    writer.text(1, row, "--- BY STOREY ---");
    for (storey, total) in &cost.by_storey {
        row += 1;
        writer.text(1, row, storey);
        writer.number(2, row, *total, Some(CURRENCY_FORMAT));
    }
    row += 2;
    writer.text(1, row, "GRAND TOTAL");
    writer.number(2, row, cost.grand_total, Some(CURRENCY_FORMAT));
    writer.finish();
    Ok(())
}

/// Lay the report out as a workbook
pub fn build_workbook(report: &QtoReport) -> Result<Spreadsheet> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    fill_workbook(&mut book, report)?;
    Ok(book)
}

/// Add the report's sheets to `book`
///
/// A sheet that cannot be created is logged and left out; only a workbook
/// that ends up without any sheet is an error.
fn fill_workbook(book: &mut Spreadsheet, report: &QtoReport) -> Result<()> {
    if report.is_empty() {
        log::warn!("BOQ is empty, writing placeholder sheet");
        warn_on_failure(NO_DATA_SHEET, write_no_data_sheet(book));
    } else {
        write_boq_sheets(book, report);
    }
    warn_on_failure(SUMMARY_SHEET, write_summary_sheet(book, report));
    warn_on_failure(PROJECT_SHEET, write_project_sheet(book, report));
    if let Some(cost) = &report.cost {
        warn_on_failure(COST_SHEET, write_cost_sheet(book, cost));
    }

    if book.get_sheet_collection().is_empty() {
        return Err(anyhow!("no sheet could be written"));
    }
    Ok(())
}

fn warn_on_failure(sheet: &str, result: Result<()>) {
    if let Err(e) = result {
        log::warn!("Skipping sheet {}: {:#}", sheet, e);
    }
}

/// Write the report workbook, creating parent directories as needed
pub fn write_workbook(report: &QtoReport, path: &Path) -> Result<()> {
    let book = build_workbook(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    umya_spreadsheet::writer::xlsx::write(&book, path)
        .with_context(|| format!("failed to write workbook {}", path.display()))?;
    log::info!("BOQ exported to {}", path.display());
    Ok(())
}
