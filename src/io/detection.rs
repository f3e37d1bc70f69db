// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Format detection using the C3D header key.
//!
//! C3D files have no magic string. The second byte of the header block is
//! always `0x50` and the first byte points at a parameter block after the
//! header, which together are distinctive enough to tell a capture file
//! apart from arbitrary data.
//!
//! # Example
//!
//! ```rust,no_run
//! use c3dcodec::io::detection::{detect_format, FileFormat};
//!
//! let format = detect_format("trial01.c3d")?;
//! assert_eq!(format, FileFormat::C3d);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::io::formats::c3d::C3dHeader;
use crate::CodecError;

/// Recognised file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// C3D biomechanics capture
    C3d,
    /// Anything else
    Unknown,
}

/// Detect the file format from content, falling back to the extension.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<FileFormat, CodecError> {
    let path_ref = path.as_ref();

    match detect_from_magic(path_ref) {
        Ok(FileFormat::Unknown) | Err(_) => {}
        Ok(format) => return Ok(format),
    }

    Ok(detect_from_extension(path_ref))
}

/// Detect format by reading the first header bytes.
fn detect_from_magic(path: &Path) -> Result<FileFormat, CodecError> {
    let mut file = File::open(path).map_err(|e| {
        CodecError::format("FormatDetection", format!("Failed to open file: {e}"))
    })?;

    let mut header = [0u8; 2];
    if file.read_exact(&mut header).is_err() {
        return Ok(FileFormat::Unknown);
    }

    if C3dHeader::parameter_block_of(&header).is_ok() {
        Ok(FileFormat::C3d)
    } else {
        Ok(FileFormat::Unknown)
    }
}

/// Detect format from file extension (fallback).
fn detect_from_extension(path: &Path) -> FileFormat {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| match ext.to_lowercase().as_str() {
            "c3d" => FileFormat::C3d,
            _ => FileFormat::Unknown,
        })
        .unwrap_or(FileFormat::Unknown)
}

/// Check if a file is likely a C3D capture.
pub fn is_c3d_file<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format(path), Ok(FileFormat::C3d))
}
