// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Processor-specific number decoding.
//!
//! C3D files record the processor family that wrote them in the parameter
//! section header. That byte decides how every 16-bit word and 32-bit float
//! in the file is laid out:
//!
//! | code | family | integers      | floats                             |
//! |------|--------|---------------|------------------------------------|
//! | 84   | Intel  | little-endian | IEEE little-endian                 |
//! | 85   | DEC    | little-endian | VAX F: swapped 16-bit words, bias 4 |
//! | 86   | MIPS   | big-endian    | IEEE big-endian                    |

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::Serialize;

use crate::{CodecError, Result};

/// Byte-order family of a capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Processor {
    /// Intel x86 (little-endian IEEE)
    Intel,
    /// DEC VAX (little-endian integers, VAX F floats)
    Dec,
    /// SGI/MIPS (big-endian IEEE)
    Mips,
}

impl Processor {
    /// Processor code for Intel.
    pub const INTEL_CODE: u8 = 84;
    /// Processor code for DEC.
    pub const DEC_CODE: u8 = 85;
    /// Processor code for MIPS.
    pub const MIPS_CODE: u8 = 86;

    /// Resolve a processor from the parameter section header byte.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            Self::INTEL_CODE => Ok(Processor::Intel),
            Self::DEC_CODE => Ok(Processor::Dec),
            Self::MIPS_CODE => Ok(Processor::Mips),
            other => Err(CodecError::format(
                "Processor::from_code",
                format!("unknown processor type {other}"),
            )),
        }
    }

    /// The parameter section code for this processor.
    pub fn code(&self) -> u8 {
        match self {
            Processor::Intel => Self::INTEL_CODE,
            Processor::Dec => Self::DEC_CODE,
            Processor::Mips => Self::MIPS_CODE,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Processor::Intel => "intel",
            Processor::Dec => "dec",
            Processor::Mips => "mips",
        }
    }

    #[inline]
    fn is_big_endian(&self) -> bool {
        matches!(self, Processor::Mips)
    }

    /// Decode a signed 16-bit word.
    #[inline]
    pub fn i16_from(&self, bytes: &[u8]) -> i16 {
        if self.is_big_endian() {
            BigEndian::read_i16(bytes)
        } else {
            LittleEndian::read_i16(bytes)
        }
    }

    /// Decode an unsigned 16-bit word.
    #[inline]
    pub fn u16_from(&self, bytes: &[u8]) -> u16 {
        if self.is_big_endian() {
            BigEndian::read_u16(bytes)
        } else {
            LittleEndian::read_u16(bytes)
        }
    }

    /// Decode a 32-bit float.
    pub fn f32_from(&self, bytes: &[u8]) -> f32 {
        match self {
            Processor::Intel => LittleEndian::read_f32(bytes),
            Processor::Mips => BigEndian::read_f32(bytes),
            Processor::Dec => {
                // VAX F stores the high word first and biases the exponent by 2.
                let swapped = [bytes[2], bytes[3], bytes[0], bytes[1]];
                LittleEndian::read_f32(&swapped) / 4.0
            }
        }
    }
}
