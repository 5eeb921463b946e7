// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command line arguments

use anyhow::{Context, Result};
use clap::Parser;
use ifc_qto_core::{GroupBy, QtoConfig, RateTable, RunOptions};
use std::path::{Path, PathBuf};

/// Rate file used by `--cost` when `--rates` is not given
pub const DEFAULT_RATES: &str = "rates.json";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ifc-qto",
    version,
    about = "Extract quantities from IFC files and generate bills of quantities",
    after_help = "Examples:\n  ifc-qto model.ifc boq.xlsx\n  ifc-qto model.ifc boq.xlsx --grouping all --cost --rates rates.json"
)]
pub struct CliArgs {
    /// Input IFC (STEP) file
    pub input: PathBuf,

    /// Output workbook (.xlsx)
    pub output: PathBuf,

    /// BOQ grouping: type, storey, material or all
    #[arg(short, long, env = "BIM_QTO_GROUPING")]
    pub grouping: Option<GroupBy>,

    /// Price the BOQ with unit rates
    #[arg(long)]
    pub cost: bool,

    /// Unit rate file (JSON); implies --cost
    #[arg(long, value_name = "FILE")]
    pub rates: Option<PathBuf>,

    /// Take-off configuration (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the full report as JSON
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "BIM_QTO_LOG_LEVEL", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// True when costs were requested
    pub fn cost_enabled(&self) -> bool {
        self.cost || self.rates.is_some()
    }

    /// Rate file to read when costs are requested
    pub fn rates_path(&self) -> &Path {
        self.rates.as_deref().unwrap_or(Path::new(DEFAULT_RATES))
    }

    /// Configuration file, then command line and environment overrides
    pub fn config(&self) -> Result<QtoConfig> {
        let mut config = match &self.config {
            Some(path) => QtoConfig::load(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?,
            None => QtoConfig::default(),
        };
        if let Some(grouping) = self.grouping {
            config.grouping = grouping;
        }
        Ok(config)
    }

    /// Options for the take-off run
    pub fn run_options(&self) -> Result<RunOptions> {
        let rates = if self.cost_enabled() {
            let path = self.rates_path();
            let table = RateTable::load(path)
                .with_context(|| format!("failed to read rate file {}", path.display()))?;
            Some(table)
        } else {
            None
        };

        Ok(RunOptions {
            config: self.config()?,
            rates,
            file_path: Some(self.input.display().to_string()),
        })
    }
}
