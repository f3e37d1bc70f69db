// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::io::IsTerminal as _;
use std::path::Path;

use c3dcodec::{DecodeOptions, TimeSeriesTable};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Load decode options from `--config`, or use defaults.
pub fn load_options(path: Option<&Path>) -> Result<DecodeOptions> {
    match path {
        Some(path) => Ok(DecodeOptions::load(path)?),
        None => Ok(DecodeOptions::default()),
    }
}

/// Format a duration in seconds to human-readable string.
pub fn format_seconds(secs: f64) -> String {
    if secs >= 60.0 {
        let minutes = (secs / 60.0).floor();
        format!("{}m {:.3}s", minutes as u64, secs - minutes * 60.0)
    } else {
        format!("{secs:.3}s")
    }
}

/// Print the first `rows` rows of a table.
pub fn print_table_head(name: &str, table: &TimeSeriesTable, rows: usize) {
    println!(
        "{name}: {} rows x {} columns",
        table.row_count(),
        table.column_count()
    );
    if rows == 0 || table.row_count() == 0 {
        return;
    }

    println!("  time\t{}", table.columns().join("\t"));
    for row in 0..rows.min(table.row_count()) {
        let values: Vec<String> = table
            .row(row)
            .unwrap_or_default()
            .iter()
            .map(|v| format!("{v:.4}"))
            .collect();
        println!("  {:.4}\t{}", table.time()[row], values.join("\t"));
    }
}

/// Progress bar wrapper for consistent progress reporting.
pub struct ProgressBar {
    inner: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a new progress bar, hidden when stderr is not a terminal.
    pub fn new(total: u64, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let inner = if std::io::stderr().is_terminal() {
            let pb = indicatif::ProgressBar::new(total);
            if let Ok(style) = indicatif::ProgressStyle::default_bar()
                .template("{prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb.set_prefix(prefix);
            Some(pb)
        } else {
            None
        };

        Self { inner }
    }

    /// Advance by one.
    pub fn inc(&self) {
        if let Some(pb) = &self.inner {
            pb.inc(1);
        }
    }

    /// Finish the progress bar with a message.
    pub fn finish_with_message(&self, msg: String) {
        if let Some(pb) = &self.inner {
            pb.finish_with_message(msg);
        }
    }
}
