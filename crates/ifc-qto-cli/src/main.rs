// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ifc-qto` - IFC quantity take-off to an Excel bill of quantities

mod cli;
mod export;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::CliArgs;
use ifc_qto_core::QtoReport;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    logging::init_logging(args.log_level.as_deref(), args.verbose)?;

    if let Err(e) = run(&args) {
        tracing::error!("Take-off failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

fn run(args: &CliArgs) -> Result<()> {
    tracing::info!(
        input = %args.input.display(),
        output = %args.output.display(),
        "Starting quantity take-off"
    );
    let options = args.run_options()?;

    let document = ifc_qto_parser::open(&args.input)
        .with_context(|| format!("failed to read IFC file {}", args.input.display()))?;
    let report = ifc_qto_core::run(&document, &options).context("quantity take-off failed")?;

    if let Some(path) = &args.json {
        write_json(&report, path)?;
    }
    export::write_workbook(&report, &args.output)?;

    tracing::info!(
        lines = report.boq.len(),
        priced = report.cost.is_some(),
        "Processing completed"
    );
    Ok(())
}

fn write_json(report: &QtoReport, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create JSON report {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("failed to write JSON report {}", path.display()))?;
    log::info!("JSON report written to {}", path.display());
    Ok(())
}
