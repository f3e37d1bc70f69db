// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! C3D container reader.
//!
//! Opening a reader parses the header block and the parameter section; frame
//! records are only touched when [`C3dReader::frames`] is called.
//!
//! Opening happens in three steps because the header cannot be decoded
//! until the processor byte inside the parameter section is known:
//! 1. Read block 1 and validate the key byte
//! 2. Read the parameter section header to get processor type and block count
//! 3. Decode the header words, then parse the parameter records

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use super::frames::{FrameLayout, FrameReader};
use super::header::{C3dHeader, BLOCK_SIZE};
use super::parameter::{ParameterSection, SECTION_HEADER_SIZE};
use crate::core::Processor;
use crate::{CodecError, Result};

/// Parsed C3D container, ready to stream frame records.
pub struct C3dReader<R> {
    reader: R,
    header: C3dHeader,
    processor: Processor,
    parameters: ParameterSection,
}

impl C3dReader<BufReader<File>> {
    /// Open a C3D file.
    ///
    /// Fails with [`CodecError::NotFound`] if the path does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CodecError::not_found(path)
            } else {
                CodecError::format("C3dReader::open", format!("Failed to open file: {e}"))
            }
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> C3dReader<R> {
    /// Parse header and parameter section from a seekable source.
    pub fn from_reader(mut reader: R) -> Result<Self> {
        let mut block = vec![0u8; BLOCK_SIZE];
        reader.read_exact(&mut block).map_err(|e| {
            CodecError::format(
                "C3dReader::from_reader",
                format!("Failed to read header block: {e}"),
            )
        })?;
        let parameter_block = C3dHeader::parameter_block_of(&block)?;

        let parameter_offset = (parameter_block as u64 - 1) * BLOCK_SIZE as u64;
        reader.seek(SeekFrom::Start(parameter_offset))?;
        let mut section_header = [0u8; SECTION_HEADER_SIZE];
        reader.read_exact(&mut section_header).map_err(|e| {
            CodecError::format(
                "C3dReader::from_reader",
                format!("Failed to read parameter section header: {e}"),
            )
        })?;
        let processor = Processor::from_code(section_header[3])?;
        let header = C3dHeader::parse(&block, processor)?;

        // Some writers leave the block count at zero; fall back to
        // everything up to the data section.
        let declared_blocks = section_header[2] as usize;
        let section_blocks = if declared_blocks > 0 {
            declared_blocks
        } else {
            (header.data_block as usize).saturating_sub(parameter_block as usize)
        };
        let section_len = section_blocks.max(1) * BLOCK_SIZE;

        let mut section = Vec::with_capacity(section_len);
        section.extend_from_slice(&section_header);
        (&mut reader)
            .take((section_len - SECTION_HEADER_SIZE) as u64)
            .read_to_end(&mut section)?;
        let parameters = ParameterSection::parse(&section, processor)?;

        debug!(
            processor = processor.as_str(),
            points = header.point_count,
            analog_total = header.analog_total,
            first_frame = header.first_frame,
            last_frame = header.last_frame,
            groups = parameters.len(),
            "opened C3D container"
        );

        Ok(Self {
            reader,
            header,
            processor,
            parameters,
        })
    }

    /// Header block.
    pub fn header(&self) -> &C3dHeader {
        &self.header
    }

    /// Processor family the file was written with.
    pub fn processor(&self) -> Processor {
        self.processor
    }

    /// Parameter section.
    pub fn parameters(&self) -> &ParameterSection {
        &self.parameters
    }

    /// Inclusive frame number range `(first, last)`.
    ///
    /// `TRIAL:ACTUAL_START_FIELD` / `TRIAL:ACTUAL_END_FIELD` override the
    /// 16-bit header words when present, which allows captures longer
    /// than 65535 frames.
    pub fn frame_range(&self) -> (u32, u32) {
        let field = |name: &str| {
            self.parameters
                .get("TRIAL", name)
                .and_then(|p| p.as_i64_vec())
                .filter(|words| words.len() >= 2)
                .map(|words| (words[0] as u16 as u32) | ((words[1] as u16 as u32) << 16))
        };
        match (field("ACTUAL_START_FIELD"), field("ACTUAL_END_FIELD")) {
            (Some(first), Some(last)) => (first, last),
            _ => (self.header.first_frame as u32, self.header.last_frame as u32),
        }
    }

    /// Number of frames in `frame_range()`; zero when the range is inverted.
    pub fn frame_count(&self) -> usize {
        let (first, last) = self.frame_range();
        if last < first {
            0
        } else {
            (last - first) as usize + 1
        }
    }

    /// Build the frame storage layout from header and `ANALOG` parameters.
    pub fn frame_layout(&self) -> FrameLayout {
        let analog_channels = self.header.analog_channels();
        let numbers = |name: &str| {
            self.parameters
                .get("ANALOG", name)
                .filter(|p| !p.is_empty())
                .and_then(|p| p.as_f64_vec())
                .unwrap_or_default()
        };

        let gen_scale = self
            .parameters
            .get("ANALOG", "GEN_SCALE")
            .and_then(|p| p.as_f64())
            .unwrap_or(1.0);
        let scales = numbers("SCALE");
        let offsets = numbers("OFFSET");

        let analog_scale = (0..analog_channels)
            .map(|c| scales.get(c).copied().unwrap_or(1.0) * gen_scale)
            .collect();
        let analog_offset = (0..analog_channels)
            .map(|c| offsets.get(c).copied().unwrap_or(0.0))
            .collect();

        let analog_unsigned = self
            .parameters
            .get("ANALOG", "FORMAT")
            .and_then(|p| p.raw_strings())
            .and_then(|s| s.first().map(|f| f.eq_ignore_ascii_case(b"UNSIGNED")))
            .unwrap_or(false);

        FrameLayout {
            point_count: self.header.point_count as usize,
            analog_channels,
            analog_per_frame: self.header.analog_per_frame as usize,
            is_float: self.header.is_float(),
            point_scale: self.header.scale_factor.abs() as f64,
            analog_unsigned,
            analog_scale,
            analog_offset,
        }
    }

    /// Seek to the data section and stream frame records in file order.
    ///
    /// Fails with [`CodecError::StructuralRead`] before any frame is read
    /// when the data section is too short for the declared frame range.
    pub fn frames(&mut self) -> Result<FrameReader<&mut R>> {
        let layout = self.frame_layout();
        let (first, last) = self.frame_range();
        let data_offset = self.header.data_offset();
        let seek_failed = |e: std::io::Error| {
            CodecError::structural(first, format!("Failed to seek to data section: {e}"))
        };

        let end = self.reader.seek(SeekFrom::End(0)).map_err(seek_failed)?;
        let stored = frames_stored(end.saturating_sub(data_offset), layout.frame_size());
        let declared = self.frame_count() as u64;
        if stored < declared {
            // stored < declared <= last - first + 1, so this stays within u32
            let missing = (first as u64 + stored) as u32;
            return Err(CodecError::structural(
                missing,
                format!("data section holds {stored} of {declared} frames"),
            ));
        }

        self.reader
            .seek(SeekFrom::Start(data_offset))
            .map_err(seek_failed)?;
        Ok(FrameReader::new(
            &mut self.reader,
            self.processor,
            layout,
            first,
            last,
        ))
    }
}

/// Whole frame records that fit in `data_len` bytes.
fn frames_stored(data_len: u64, frame_size: usize) -> u64 {
    match frame_size {
        0 => u64::MAX,
        size => data_len / size as u64,
    }
}
