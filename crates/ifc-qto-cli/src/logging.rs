// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscriber setup
//!
//! Library crates log through `log`; the subscriber's log bridge picks those
//! records up alongside native `tracing` events.

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for the requested verbosity
///
/// `--verbose` wins over the configured level. `WARNING` and `CRITICAL`
/// are accepted as aliases of `warn` and `error`.
pub fn filter_directive(level: Option<&str>, verbose: bool) -> String {
    if verbose {
        return "debug".to_string();
    }
    let level = level
        .map(|l| l.trim().to_ascii_lowercase())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| "info".to_string());
    match level.as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        _ => level,
    }
}

/// Install the global subscriber; `RUST_LOG` overrides everything
pub fn init_logging(level: Option<&str>, verbose: bool) -> Result<()> {
    let directive = filter_directive(level, verbose);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .try_init()?;
    Ok(())
}
