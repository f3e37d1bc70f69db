// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.
//!
//! [`CaptureFixture`] writes small synthetic C3D files. Sample values are
//! derived from their position so tests can compute the expected decoded
//! value of any cell.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const INTEL: u8 = 84;
pub const DEC: u8 = 85;
pub const MIPS: u8 = 86;

const BLOCK: usize = 512;

// ============================================================================
// Byte encoding
// ============================================================================

fn i16_bytes(processor: u8, value: i16) -> [u8; 2] {
    if processor == MIPS {
        value.to_be_bytes()
    } else {
        value.to_le_bytes()
    }
}

fn u16_bytes(processor: u8, value: u16) -> [u8; 2] {
    i16_bytes(processor, value as i16)
}

fn f32_bytes(processor: u8, value: f32) -> [u8; 4] {
    match processor {
        MIPS => value.to_be_bytes(),
        DEC => {
            let ieee = (value * 4.0).to_le_bytes();
            [ieee[2], ieee[3], ieee[0], ieee[1]]
        }
        _ => value.to_le_bytes(),
    }
}

// ============================================================================
// Parameter section writer
// ============================================================================

/// Typed parameter payload.
#[derive(Debug, Clone)]
pub enum Value {
    /// Strings padded to a common length, dims `[len, count]`
    Strings(Vec<Vec<u8>>),
    /// 16-bit integers, dims `[count]`
    Ints(Vec<i16>),
    /// Floats with explicit dims
    Floats(Vec<u8>, Vec<f32>),
    /// Scalar float, no dims
    Float(f32),
    /// Scalar integer, no dims
    Int(i16),
}

impl Value {
    pub fn strings<S: AsRef<[u8]>>(values: &[S]) -> Self {
        Value::Strings(values.iter().map(|s| s.as_ref().to_vec()).collect())
    }
}

struct SectionWriter {
    processor: u8,
    bytes: Vec<u8>,
}

impl SectionWriter {
    fn new(processor: u8) -> Self {
        Self {
            processor,
            bytes: Vec::new(),
        }
    }

    /// Append a record whose body follows the offset field.
    fn record(&mut self, name: &str, id: i8, body: &[u8]) {
        self.bytes.push(name.len() as u8);
        self.bytes.push(id as u8);
        self.bytes.extend_from_slice(name.as_bytes());
        // Offset counts from the offset field itself.
        let offset = (2 + body.len()) as i16;
        self.bytes
            .extend_from_slice(&i16_bytes(self.processor, offset));
        self.bytes.extend_from_slice(body);
    }

    fn group(&mut self, id: i8, name: &str) {
        let desc = format!("{name} group");
        let mut body = vec![desc.len() as u8];
        body.extend_from_slice(desc.as_bytes());
        self.record(name, -id, &body);
    }

    fn param(&mut self, group: i8, name: &str, value: &Value) {
        let p = self.processor;
        let mut body = Vec::new();
        match value {
            Value::Strings(strings) => {
                let len = strings.iter().map(|s| s.len()).max().unwrap_or(0);
                body.push((-1i8) as u8);
                body.push(2);
                body.push(len as u8);
                body.push(strings.len() as u8);
                for s in strings {
                    body.extend_from_slice(s);
                    body.extend(std::iter::repeat(b' ').take(len - s.len()));
                }
            }
            Value::Ints(values) => {
                body.extend_from_slice(&[2, 1, values.len() as u8]);
                for v in values {
                    body.extend_from_slice(&i16_bytes(p, *v));
                }
            }
            Value::Int(v) => {
                body.extend_from_slice(&[2, 0]);
                body.extend_from_slice(&i16_bytes(p, *v));
            }
            Value::Float(v) => {
                body.extend_from_slice(&[4, 0]);
                body.extend_from_slice(&f32_bytes(p, *v));
            }
            Value::Floats(dims, values) => {
                body.push(4);
                body.push(dims.len() as u8);
                body.extend_from_slice(dims);
                for v in values {
                    body.extend_from_slice(&f32_bytes(p, *v));
                }
            }
        }
        body.push(0); // no description
        self.record(name, group, &body);
    }

    /// Section bytes including the 4-byte header, padded to whole blocks.
    fn finish(self) -> Vec<u8> {
        let blocks = (4 + self.bytes.len()).div_ceil(BLOCK).max(1);
        let mut out = vec![0x01, 0x50, blocks as u8, self.processor];
        out.extend_from_slice(&self.bytes);
        out.resize(blocks * BLOCK, 0);
        out
    }
}

// ============================================================================
// Capture fixture
// ============================================================================

/// Synthetic capture description.
#[derive(Debug, Clone)]
pub struct CaptureFixture {
    pub processor: u8,
    pub float_storage: bool,
    /// Point scale for integer storage
    pub point_scale: f32,
    pub markers: Vec<String>,
    pub analog_labels: Vec<String>,
    pub camera_rate: Option<f32>,
    pub analog_rate: Option<f32>,
    pub first_frame: u16,
    pub frames: usize,
    /// Header analog samples per frame; defaults to the rate ratio
    pub samples_per_frame: Option<u16>,
    pub analog_scale: Option<Vec<f32>>,
    pub analog_offset: Option<Vec<i16>>,
    pub gen_scale: f32,
    /// `SSCDATAANDPROCESSING:USER` raw bytes
    pub user: Option<Vec<u8>>,
    pub date_of_capture: Option<String>,
    pub subject_names: Option<Vec<String>>,
    pub body_mass: Option<f32>,
    pub height: Option<f32>,
    /// Corner X-coordinates, four per plate
    pub plate_corner_x: Option<Vec<[f32; 4]>>,
    /// Write only this many frame records
    pub written_frames: Option<usize>,
    /// Extra bytes after the last full frame
    pub trailing_bytes: usize,
    /// `TRIAL:ACTUAL_START_FIELD` / `ACTUAL_END_FIELD`
    pub actual_range: Option<(u32, u32)>,
}

impl Default for CaptureFixture {
    /// Camera 100 Hz, analog 1000 Hz, 50 frames, 2 markers, 2 plates × 6 channels.
    fn default() -> Self {
        Self {
            processor: INTEL,
            float_storage: true,
            point_scale: 0.5,
            markers: vec!["LHEE".into(), "R TOE".into()],
            analog_labels: [
                "Force.Fx1", "Force.Fy1", "Force.Fz1", "Moment.Mx1", "Moment.My1",
                "Moment.Mz1", "Force.Fx2", "Force.Fy2", "Force.Fz2", "Moment.Mx2",
                "Moment.My2", "Moment.Mz2",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            camera_rate: Some(100.0),
            analog_rate: Some(1000.0),
            first_frame: 1,
            frames: 50,
            samples_per_frame: None,
            analog_scale: None,
            analog_offset: None,
            gen_scale: 1.0,
            user: Some(b"operator".to_vec()),
            date_of_capture: Some("2024-03-18".into()),
            subject_names: Some(vec!["S01".into()]),
            body_mass: Some(72.5),
            height: Some(1.75),
            plate_corner_x: Some(vec![[0.0, 500.0, 500.0, 0.0], [500.0, 1000.0, 1000.0, 500.0]]),
            written_frames: None,
            trailing_bytes: 0,
            actual_range: None,
        }
    }
}

impl CaptureFixture {
    /// Analog samples per frame derived from the rates.
    pub fn ratio(&self) -> usize {
        match (self.camera_rate, self.analog_rate) {
            (Some(c), Some(a)) if c > 0.0 => (a / c).round().max(1.0) as usize,
            _ => 1,
        }
    }

    pub fn header_samples_per_frame(&self) -> u16 {
        self.samples_per_frame.unwrap_or(self.ratio() as u16)
    }

    pub fn channels(&self) -> usize {
        self.analog_labels.len()
    }

    /// Stored value of `axis` of `marker` in frame index `frame`.
    pub fn stored_point(&self, frame: usize, marker: usize, axis: usize) -> f32 {
        (frame * 4 + marker * 1000 + axis * 300) as f32
    }

    /// Decoded value of a point coordinate.
    pub fn expected_point(&self, frame: usize, marker: usize, axis: usize) -> f64 {
        let stored = self.stored_point(frame, marker, axis) as f64;
        if self.float_storage {
            stored
        } else {
            stored * self.point_scale.abs() as f64
        }
    }

    /// Stored raw value of `channel` at analog row `row`.
    pub fn stored_analog(&self, row: usize, channel: usize) -> f32 {
        (row % 2000) as f32 + channel as f32 * 2000.0
    }

    /// Decoded analog value before sign correction.
    pub fn expected_analog(&self, row: usize, channel: usize) -> f64 {
        let raw = self.stored_analog(row, channel) as f64;
        let offset = self
            .analog_offset
            .as_ref()
            .and_then(|o| o.get(channel))
            .map_or(0.0, |&o| o as f64);
        let scale = self
            .analog_scale
            .as_ref()
            .and_then(|s| s.get(channel))
            .map_or(1.0, |&s| s as f64);
        (raw - offset) * (scale * self.gen_scale as f64)
    }

    fn parameter_section(&self) -> Vec<u8> {
        let mut w = SectionWriter::new(self.processor);

        w.group(1, "POINT");
        w.param(1, "USED", &Value::Int(self.markers.len() as i16));
        w.param(1, "LABELS", &Value::strings(&self.markers));
        w.param(1, "UNITS", &Value::strings(&["mm"]));
        if let Some(rate) = self.camera_rate {
            w.param(1, "RATE", &Value::Float(rate));
        }

        w.group(2, "ANALOG");
        w.param(2, "USED", &Value::Int(self.analog_labels.len() as i16));
        w.param(2, "LABELS", &Value::strings(&self.analog_labels));
        if let Some(rate) = self.analog_rate {
            w.param(2, "RATE", &Value::Float(rate));
        }
        if let Some(scale) = &self.analog_scale {
            w.param(2, "SCALE", &Value::Floats(vec![scale.len() as u8], scale.clone()));
        }
        if let Some(offset) = &self.analog_offset {
            w.param(2, "OFFSET", &Value::Ints(offset.clone()));
        }
        w.param(2, "GEN_SCALE", &Value::Float(self.gen_scale));

        w.group(3, "TRIAL");
        if let Some(rate) = self.camera_rate {
            w.param(3, "CAMERA_RATE", &Value::Float(rate));
        }
        if let Some((start, end)) = self.actual_range {
            let words = |v: u32| Value::Ints(vec![(v & 0xFFFF) as u16 as i16, (v >> 16) as u16 as i16]);
            w.param(3, "ACTUAL_START_FIELD", &words(start));
            w.param(3, "ACTUAL_END_FIELD", &words(end));
        }

        if let Some(names) = &self.subject_names {
            w.group(4, "SUBJECTS");
            w.param(4, "NAMES", &Value::strings(names));
        }

        if self.body_mass.is_some() || self.height.is_some() {
            w.group(5, "PROCESSING");
            if let Some(mass) = self.body_mass {
                w.param(5, "BODYMASS", &Value::Float(mass));
            }
            if let Some(height) = self.height {
                w.param(5, "HEIGHT", &Value::Float(height));
            }
        }

        if self.user.is_some() || self.date_of_capture.is_some() {
            w.group(6, "SSCDATAANDPROCESSING");
            if let Some(user) = &self.user {
                w.param(6, "USER", &Value::Strings(vec![user.clone()]));
            }
            if let Some(date) = &self.date_of_capture {
                w.param(6, "DATEOFCAPTURE", &Value::strings(&[date]));
            }
        }

        if let Some(plates) = &self.plate_corner_x {
            w.group(7, "FORCE_PLATFORM");
            w.param(7, "USED", &Value::Int(plates.len() as i16));
            let corners: Vec<f32> = plates
                .iter()
                .flat_map(|xs| xs.iter().flat_map(|&x| [x, 0.0, 0.0]))
                .collect();
            w.param(
                7,
                "CORNERS",
                &Value::Floats(vec![3, 4, plates.len() as u8], corners),
            );
        }

        w.finish()
    }

    fn header(&self, data_block: u16) -> Vec<u8> {
        let p = self.processor;
        let spf = self.header_samples_per_frame();
        let last = self.first_frame as usize + self.frames - 1;
        let scale = if self.float_storage {
            -self.point_scale.abs()
        } else {
            self.point_scale.abs()
        };

        let mut block = vec![0u8; BLOCK];
        block[0] = 2;
        block[1] = 0x50;
        block[2..4].copy_from_slice(&u16_bytes(p, self.markers.len() as u16));
        block[4..6].copy_from_slice(&u16_bytes(p, self.channels() as u16 * spf));
        block[6..8].copy_from_slice(&u16_bytes(p, self.first_frame));
        block[8..10].copy_from_slice(&u16_bytes(p, last as u16));
        block[12..16].copy_from_slice(&f32_bytes(p, scale));
        block[16..18].copy_from_slice(&u16_bytes(p, data_block));
        block[18..20].copy_from_slice(&u16_bytes(p, spf));
        block[20..24].copy_from_slice(&f32_bytes(p, self.camera_rate.unwrap_or(0.0)));
        block
    }

    fn word(&self, out: &mut Vec<u8>, value: f32) {
        if self.float_storage {
            out.extend_from_slice(&f32_bytes(self.processor, value));
        } else {
            out.extend_from_slice(&i16_bytes(self.processor, value as i16));
        }
    }

    fn frame_data(&self) -> Vec<u8> {
        let spf = self.header_samples_per_frame() as usize;
        let frames = self.written_frames.unwrap_or(self.frames);
        let mut out = Vec::new();
        for frame in 0..frames {
            for marker in 0..self.markers.len() {
                for axis in 0..3 {
                    self.word(&mut out, self.stored_point(frame, marker, axis));
                }
                self.word(&mut out, 0.0);
            }
            for s in 0..spf {
                for channel in 0..self.channels() {
                    self.word(&mut out, self.stored_analog(frame * spf + s, channel));
                }
            }
        }
        out.extend(std::iter::repeat(0u8).take(self.trailing_bytes));
        out
    }

    /// Encode the whole file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let section = self.parameter_section();
        let data_block = (2 + section.len() / BLOCK) as u16;
        let mut bytes = self.header(data_block);
        bytes.extend_from_slice(&section);
        bytes.extend_from_slice(&self.frame_data());
        bytes
    }

    /// Write the file into `dir`.
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}
