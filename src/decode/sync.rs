// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Frame synchronization.
//!
//! Splits the interleaved frame stream into a motion-capture table at the
//! camera rate and a force-plate table at the analog rate. Analog rows are
//! assigned to camera frames through a boundary table computed once with
//! integer arithmetic, so the two time axes stay aligned over long trials.

use serde::Serialize;
use tracing::debug;

use super::labels::ChannelLabelSet;
use super::metadata::CaptureMetadata;
use super::table::{ForcePlateTable, MotionCaptureTable, TimeSeriesTable};
use crate::io::formats::c3d::Frame;
use crate::{CodecError, Result};

/// Force channels recorded with the opposite sign convention.
pub const SIGN_CORRECTED_CHANNELS: [&str; 6] = ["Fx1", "Fy1", "Fz1", "Fx2", "Fy2", "Fz2"];

/// Both sample tables of a capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureSamples {
    /// Marker trajectories at the camera rate
    pub motion: MotionCaptureTable,
    /// Analog channels at the analog rate
    pub force: ForcePlateTable,
}

/// First analog row of every camera frame, plus the end row.
///
/// Returns `frame_count + 1` entries with
/// `boundary[i] = floor(i × analog_rows / frame_count)`.
pub fn analog_boundaries(frame_count: usize, analog_rows: usize) -> Vec<usize> {
    if frame_count == 0 {
        return vec![0];
    }
    (0..=frame_count)
        .map(|i| (i as u128 * analog_rows as u128 / frame_count as u128) as usize)
        .collect()
}

/// Timestamps `index / rate` for `rows` rows.
fn time_axis(rows: usize, rate: f64) -> Vec<f64> {
    (0..rows).map(|i| i as f64 / rate).collect()
}

/// Single-pass splitter for one capture's frame stream.
#[derive(Debug, Clone)]
pub struct FrameSynchronizer {
    first_frame: u32,
    last_frame: u32,
    frame_count: usize,
    camera_rate: f64,
    analog_rate: f64,
    boundaries: Vec<usize>,
    labels: ChannelLabelSet,
}

impl FrameSynchronizer {
    /// Plan the split of a capture.
    ///
    /// `samples_per_frame` is the analog sub-sample count stored in each
    /// frame record and must equal the metadata frequency ratio.
    pub fn new(
        metadata: &CaptureMetadata,
        labels: &ChannelLabelSet,
        samples_per_frame: usize,
    ) -> Result<Self> {
        let ratio = metadata.frequency_ratio;
        if samples_per_frame != ratio {
            return Err(CodecError::format(
                "FrameSynchronizer",
                format!(
                    "frames carry {samples_per_frame} analog samples but the rates imply {ratio}"
                ),
            ));
        }

        let frame_count = metadata.frame_count();
        let boundaries = analog_boundaries(frame_count, frame_count * ratio);

        Ok(Self {
            first_frame: metadata.first_frame,
            last_frame: metadata.last_frame,
            frame_count,
            camera_rate: metadata.camera_rate,
            analog_rate: metadata.analog_rate,
            boundaries,
            labels: labels.clone(),
        })
    }

    /// Camera frames that will be retained.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Analog rows that will be produced.
    pub fn analog_rows(&self) -> usize {
        self.boundaries.last().copied().unwrap_or(0)
    }

    /// Boundary table, see [`analog_boundaries`].
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Consume a frame stream and build both tables.
    ///
    /// Frames numbered outside the capture range are skipped. Any error
    /// from the stream, a frame whose analog sample count does not fill
    /// its rows, or a stream that ends early aborts the whole pass.
    pub fn synchronize<I>(&self, frames: I) -> Result<CaptureSamples>
    where
        I: IntoIterator<Item = Result<Frame>>,
    {
        let motion_width = self.labels.motion.len();
        let analog_width = self.labels.analog.len();
        let analog_rows = self.analog_rows();

        let mut motion = Vec::with_capacity(self.frame_count * motion_width);
        let mut analog = Vec::with_capacity(analog_rows * analog_width);
        let mut retained = 0usize;
        let mut last_number = self.first_frame;

        for frame in frames {
            if retained == self.frame_count {
                break;
            }
            let frame = frame?;
            last_number = frame.number;
            if frame.number < self.first_frame || frame.number > self.last_frame {
                debug!(frame = frame.number, "skipping frame outside capture range");
                continue;
            }

            if frame.points.len() < motion_width {
                return Err(CodecError::structural(
                    frame.number,
                    format!(
                        "frame holds {} coordinates, expected {motion_width}",
                        frame.points.len()
                    ),
                ));
            }
            motion.extend_from_slice(&frame.points[..motion_width]);

            let span = self.boundaries[retained + 1] - self.boundaries[retained];
            let samples = frame.analog_samples(analog_width);
            if samples != span || frame.analog.len() != span * analog_width {
                return Err(CodecError::structural(
                    frame.number,
                    format!("frame holds {samples} analog samples, expected {span}"),
                ));
            }
            analog.extend_from_slice(&frame.analog);

            retained += 1;
        }

        if retained < self.frame_count {
            return Err(CodecError::structural(
                last_number,
                format!(
                    "frame stream ended after {retained} of {} frames",
                    self.frame_count
                ),
            ));
        }

        let motion = TimeSeriesTable::new(
            self.labels.motion.clone(),
            time_axis(self.frame_count, self.camera_rate),
            motion,
        )?;
        let mut force = TimeSeriesTable::new(
            self.labels.analog.clone(),
            time_axis(analog_rows, self.analog_rate),
            analog,
        )?;
        correct_force_signs(&mut force);

        debug!(
            frames = motion.row_count(),
            analog_rows = force.row_count(),
            "synchronized capture"
        );
        Ok(CaptureSamples { motion, force })
    }
}

/// Negate every column named in [`SIGN_CORRECTED_CHANNELS`].
fn correct_force_signs(force: &mut ForcePlateTable) {
    let targets: Vec<usize> = force
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| SIGN_CORRECTED_CHANNELS.contains(&name.as_str()))
        .map(|(index, _)| index)
        .collect();
    for index in targets {
        force.negate_column(index);
    }
}
