// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Time-indexed sample tables.

use serde::Serialize;

use crate::{CodecError, Result};

/// A dense, row-major table of samples indexed by elapsed time in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesTable {
    columns: Vec<String>,
    time: Vec<f64>,
    values: Vec<f64>,
}

/// Marker trajectories, one column per marker axis.
pub type MotionCaptureTable = TimeSeriesTable;

/// Force-plate analog channels.
pub type ForcePlateTable = TimeSeriesTable;

impl TimeSeriesTable {
    /// Build a table from its parts.
    ///
    /// `values` must hold exactly `time.len() × columns.len()` entries in
    /// row-major order.
    pub fn new(columns: Vec<String>, time: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if values.len() != time.len() * columns.len() {
            return Err(CodecError::format(
                "TimeSeriesTable::new",
                format!(
                    "{} values do not fill {} rows × {} columns",
                    values.len(),
                    time.len(),
                    columns.len()
                ),
            ));
        }
        Ok(Self {
            columns,
            time,
            values,
        })
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.time.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in storage order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row timestamps in seconds.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// All values, row-major.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// One row of values.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let width = self.columns.len();
        if row >= self.row_count() {
            return None;
        }
        Some(&self.values[row * width..(row + 1) * width])
    }

    /// A single value.
    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        if column >= self.columns.len() {
            return None;
        }
        self.row(row).map(|r| r[column])
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate over the values of a named column.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = f64> + '_> {
        let index = self.column_index(name)?;
        Some(
            self.values
                .iter()
                .skip(index)
                .step_by(self.columns.len())
                .copied(),
        )
    }

    /// Multiply every value of a column by -1.
    pub(crate) fn negate_column(&mut self, index: usize) {
        let width = self.columns.len();
        if index >= width {
            return;
        }
        for value in self.values.iter_mut().skip(index).step_by(width) {
            *value = -*value;
        }
    }
}
