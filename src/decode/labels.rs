// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Output column names.
//!
//! Marker names become three motion columns each (`name_x`, `name_y`,
//! `name_z`). Analog names lose whitespace and the `Force.` / `Moment.`
//! prefixes capture software adds, so `Force.Fz1` becomes `Fz1`.

use std::io::{Read, Seek};

use serde::Serialize;
use tracing::debug;

use super::strings::StringFallbacks;
use crate::io::formats::c3d::{C3dReader, ParameterSection};
use crate::{CodecError, Result};

/// Axis suffixes appended to each marker name.
pub const AXIS_SUFFIXES: [&str; 3] = ["_x", "_y", "_z"];

/// Tokens removed from analog channel names.
pub const ANALOG_NOISE_TOKENS: [&str; 2] = ["Force.", "Moment."];

/// Column names of both output tables, in storage order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelLabelSet {
    /// Motion-capture columns, three per marker
    pub motion: Vec<String>,
    /// Analog columns, one per channel
    pub analog: Vec<String>,
}

impl ChannelLabelSet {
    /// Number of markers.
    pub fn marker_count(&self) -> usize {
        self.motion.len() / AXIS_SUFFIXES.len()
    }

    /// Marker names without axis suffixes.
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.motion
            .iter()
            .step_by(AXIS_SUFFIXES.len())
            .map(|label| label.strip_suffix(AXIS_SUFFIXES[0]).unwrap_or(label.as_str()))
    }
}

fn strip_whitespace(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Normalise one analog channel name.
pub fn clean_analog_label(name: &str) -> String {
    ANALOG_NOISE_TOKENS
        .iter()
        .fold(strip_whitespace(name), |label, token| label.replace(token, ""))
}

/// Expand marker names into per-axis motion columns.
///
/// `names` is truncated or padded to `points` entries. Missing markers are
/// named `Marker{n}` counting from one.
pub fn motion_labels<S: AsRef<str>>(names: &[S], points: usize) -> Vec<String> {
    let mut labels = Vec::with_capacity(points * AXIS_SUFFIXES.len());
    for n in 0..points {
        let marker = match names.get(n) {
            Some(name) => strip_whitespace(name.as_ref()),
            None => format!("Marker{}", n + 1),
        };
        labels.extend(AXIS_SUFFIXES.iter().map(|axis| format!("{marker}{axis}")));
    }
    labels
}

/// Read a continued label list and decode each entry.
fn label_list(
    parameters: &ParameterSection,
    fallbacks: &StringFallbacks,
    group: &str,
) -> Vec<String> {
    let field = format!("{group}:LABELS");
    parameters
        .continued_strings(group, "LABELS")
        .into_iter()
        .map(|raw| fallbacks.decode(&field, raw).value)
        .collect()
}

/// `GROUP:USED`, when present and numeric.
fn used_count(parameters: &ParameterSection, group: &str) -> Option<usize> {
    parameters.get(group, "USED").and_then(|p| p.as_count())
}

/// Resolve the column names of a capture.
///
/// Markers are limited to `POINT:USED` and never exceed the points stored
/// per frame.
///
/// Fails with [`CodecError::MissingField`] when there are no analog labels
/// and with a format error when their count disagrees with the channel
/// count recorded in the header.
pub fn resolve_labels<R: Read + Seek>(
    reader: &C3dReader<R>,
    fallbacks: &StringFallbacks,
) -> Result<ChannelLabelSet> {
    let parameters = reader.parameters();
    let header = reader.header();

    let stored = header.point_count as usize;
    let points = used_count(parameters, "POINT").map_or(stored, |used| used.min(stored));
    let markers = label_list(parameters, fallbacks, "POINT");
    if markers.len() < points {
        debug!(
            labelled = markers.len(),
            points, "padding unlabelled markers"
        );
    }
    let motion = motion_labels(&markers, points);

    let mut analog: Vec<String> = label_list(parameters, fallbacks, "ANALOG")
        .iter()
        .map(|name| clean_analog_label(name))
        .collect();
    if let Some(used) = used_count(parameters, "ANALOG") {
        analog.truncate(used);
    }
    if analog.is_empty() {
        return Err(CodecError::missing("ANALOG", "LABELS"));
    }

    let channels = header.analog_channels();
    if analog.len() != channels {
        return Err(CodecError::format(
            "resolve_labels",
            format!(
                "{} analog labels for {channels} channels in the frame data",
                analog.len()
            ),
        ));
    }

    debug!(
        motion = motion.len(),
        analog = analog.len(),
        "resolved channel labels"
    );
    Ok(ChannelLabelSet { motion, analog })
}
