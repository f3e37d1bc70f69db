// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! C3D header block.
//!
//! The first 512-byte block of every C3D file. Only the leading 24 bytes are
//! interpreted here; the remainder (event labels, range tables) is not needed
//! to locate or size the sample data.

use crate::core::Processor;
use crate::{CodecError, Result};

/// Size of one C3D block in bytes.
pub const BLOCK_SIZE: usize = 512;

/// Key byte stored at offset 1 of the header block.
pub const HEADER_KEY: u8 = 0x50;

/// Decoded header block.
#[derive(Debug, Clone, PartialEq)]
pub struct C3dHeader {
    /// 1-based block number where the parameter section starts
    pub parameter_block: u8,
    /// Number of 3D points stored per frame
    pub point_count: u16,
    /// Analog measurements per frame, across all channels and sub-samples
    pub analog_total: u16,
    /// First frame number (1-based)
    pub first_frame: u16,
    /// Last frame number
    pub last_frame: u16,
    /// Maximum interpolation gap
    pub max_gap: u16,
    /// Point scale factor; negative means float storage
    pub scale_factor: f32,
    /// 1-based block number where the frame records start
    pub data_block: u16,
    /// Analog sub-samples per frame, per channel
    pub analog_per_frame: u16,
    /// Point frame rate stored in the header
    pub frame_rate: f32,
}

impl C3dHeader {
    /// Check the key byte and return the parameter section start block.
    ///
    /// This needs no processor information and is used before the
    /// byte order is known.
    pub fn parameter_block_of(block: &[u8]) -> Result<u8> {
        if block.len() < 2 {
            return Err(CodecError::format(
                "C3dHeader::parameter_block_of",
                "header block is shorter than 2 bytes",
            ));
        }
        if block[1] != HEADER_KEY {
            return Err(CodecError::format(
                "C3dHeader::parameter_block_of",
                format!(
                    "invalid header key 0x{:02X}, expected 0x{HEADER_KEY:02X}",
                    block[1]
                ),
            ));
        }
        if block[0] < 2 {
            return Err(CodecError::format(
                "C3dHeader::parameter_block_of",
                format!("parameter section cannot start at block {}", block[0]),
            ));
        }
        Ok(block[0])
    }

    /// Parse the header block using the processor's byte order.
    pub fn parse(block: &[u8], processor: Processor) -> Result<Self> {
        let parameter_block = Self::parameter_block_of(block)?;
        if block.len() < 24 {
            return Err(CodecError::format(
                "C3dHeader::parse",
                format!("header block is {} bytes, expected at least 24", block.len()),
            ));
        }

        let word = |offset: usize| processor.u16_from(&block[offset..offset + 2]);

        let header = Self {
            parameter_block,
            point_count: word(2),
            analog_total: word(4),
            first_frame: word(6),
            last_frame: word(8),
            max_gap: word(10),
            scale_factor: processor.f32_from(&block[12..16]),
            data_block: word(16),
            analog_per_frame: word(18),
            frame_rate: processor.f32_from(&block[20..24]),
        };

        if header.data_block == 0 {
            return Err(CodecError::format(
                "C3dHeader::parse",
                "data section block number is 0",
            ));
        }

        Ok(header)
    }

    /// Whether samples are stored as 32-bit floats.
    #[inline]
    pub fn is_float(&self) -> bool {
        self.scale_factor < 0.0
    }

    /// Number of analog channels implied by the header.
    pub fn analog_channels(&self) -> usize {
        if self.analog_per_frame == 0 {
            0
        } else {
            self.analog_total as usize / self.analog_per_frame as usize
        }
    }

    /// Byte offset of the parameter section.
    pub fn parameter_offset(&self) -> u64 {
        (self.parameter_block as u64 - 1) * BLOCK_SIZE as u64
    }

    /// Byte offset of the first frame record.
    pub fn data_offset(&self) -> u64 {
        (self.data_block as u64 - 1) * BLOCK_SIZE as u64
    }
}
