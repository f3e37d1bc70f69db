// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Frame record stream.
//!
//! Each frame record holds every point's `x, y, z, residual` followed by the
//! analog sub-samples for that frame, sample-major:
//!
//! ```text
//! point[0].x point[0].y point[0].z point[0].res ... point[n].res
//! analog[s0][c0] analog[s0][c1] ... analog[s1][c0] ...
//! ```
//!
//! Values are 32-bit floats when the header scale factor is negative and
//! 16-bit integers otherwise.

use std::io::{ErrorKind as IoErrorKind, Read};

use crate::core::Processor;
use crate::{CodecError, Result};

/// Storage layout of one frame record, fixed before reading starts.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    /// Points per frame
    pub point_count: usize,
    /// Analog channels per sub-sample
    pub analog_channels: usize,
    /// Analog sub-samples per frame
    pub analog_per_frame: usize,
    /// Whether values are stored as floats
    pub is_float: bool,
    /// Multiplier applied to integer point coordinates
    pub point_scale: f64,
    /// Whether integer analog samples are unsigned
    pub analog_unsigned: bool,
    /// Per-channel multiplier (channel scale × general scale)
    pub analog_scale: Vec<f64>,
    /// Per-channel zero offset subtracted before scaling
    pub analog_offset: Vec<f64>,
}

impl FrameLayout {
    /// Bytes per stored value.
    #[inline]
    pub fn word_size(&self) -> usize {
        if self.is_float {
            4
        } else {
            2
        }
    }

    /// Bytes per frame record.
    pub fn frame_size(&self) -> usize {
        (self.point_count * 4 + self.analog_channels * self.analog_per_frame) * self.word_size()
    }
}

/// One decoded frame record.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Frame number as stored in the file
    pub number: u32,
    /// Point coordinates, `x, y, z` per point
    pub points: Vec<f64>,
    /// Analog samples in engineering units, sub-sample major
    pub analog: Vec<f64>,
}

impl Frame {
    /// Number of analog sub-samples carried by this frame.
    pub fn analog_samples(&self, channels: usize) -> usize {
        if channels == 0 {
            0
        } else {
            self.analog.len() / channels
        }
    }
}

/// Forward-only iterator over frame records.
///
/// Yields frames numbered `first..=last`. A short read ends iteration
/// with a [`CodecError::StructuralRead`] for the frame being read.
pub struct FrameReader<R> {
    reader: R,
    processor: Processor,
    layout: FrameLayout,
    next: u32,
    last: u32,
    buf: Vec<u8>,
    done: bool,
}

impl<R: Read> FrameReader<R> {
    /// Create a reader positioned at the first frame record.
    pub fn new(reader: R, processor: Processor, layout: FrameLayout, first: u32, last: u32) -> Self {
        let buf = vec![0u8; layout.frame_size()];
        Self {
            reader,
            processor,
            layout,
            next: first,
            last,
            buf,
            done: false,
        }
    }

    fn read_frame(&mut self, number: u32) -> Result<Frame> {
        let frame_size = self.buf.len();
        self.reader.read_exact(&mut self.buf).map_err(|e| {
            if e.kind() == IoErrorKind::UnexpectedEof {
                CodecError::structural(
                    number,
                    format!("frame stream truncated, expected {frame_size} bytes per frame"),
                )
            } else {
                CodecError::structural(number, format!("failed to read frame: {e}"))
            }
        })?;

        let layout = &self.layout;
        let word = layout.word_size();
        let value = |index: usize| -> f64 {
            let bytes = &self.buf[index * word..(index + 1) * word];
            if layout.is_float {
                self.processor.f32_from(bytes) as f64
            } else if layout.analog_unsigned && index >= layout.point_count * 4 {
                self.processor.u16_from(bytes) as f64
            } else {
                self.processor.i16_from(bytes) as f64
            }
        };

        let mut points = Vec::with_capacity(layout.point_count * 3);
        for p in 0..layout.point_count {
            for axis in 0..3 {
                let raw = value(p * 4 + axis);
                points.push(if layout.is_float {
                    raw
                } else {
                    raw * layout.point_scale
                });
            }
        }

        let analog_start = layout.point_count * 4;
        let channels = layout.analog_channels;
        let mut analog = Vec::with_capacity(channels * layout.analog_per_frame);
        for s in 0..layout.analog_per_frame {
            for c in 0..channels {
                let raw = value(analog_start + s * channels + c);
                let offset = layout.analog_offset.get(c).copied().unwrap_or(0.0);
                let scale = layout.analog_scale.get(c).copied().unwrap_or(1.0);
                analog.push((raw - offset) * scale);
            }
        }

        Ok(Frame {
            number,
            points,
            analog,
        })
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next > self.last {
            return None;
        }
        let number = self.next;
        match self.next.checked_add(1) {
            Some(next) => self.next = next,
            None => self.done = true,
        }
        let result = self.read_frame(number);
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.done || self.next > self.last {
            0
        } else {
            (self.last - self.next) as usize + 1
        };
        (0, Some(remaining))
    }
}
