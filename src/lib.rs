// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # c3dcodec
//!
//! Biomechanics capture decoder for C3D files.
//!
//! A C3D file interleaves marker trajectories sampled at the camera rate
//! with analog channels (force plates, EMG) sampled at an integer multiple
//! of it. This library turns one file into:
//! - a **motion-capture table** with one `marker_x|_y|_z` column triple per marker
//! - a **force-plate table** with one column per analog channel
//! - a **metadata record** with capture provenance, subject and plate geometry
//!
//! ## Architecture
//!
//! - `core/` - Error taxonomy and processor byte-order decoding
//! - `io/formats/c3d/` - Container reader (header, parameter section, frame records)
//! - `io/detection` - Format detection
//! - `decode/` - Metadata extraction, label resolution and frame synchronization
//!
//! ## Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use c3dcodec::decode_file;
//!
//! let capture = decode_file("walk01.c3d")?;
//! println!("camera rate: {} Hz", capture.metadata.camera_rate);
//! if let Some(force) = capture.force() {
//!     for value in force.column("Fz1").into_iter().flatten().take(5) {
//!         println!("Fz1 = {value}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{CodecError, ErrorKind, Processor, Result};

// Container I/O
pub mod io;

pub use io::{detect_format, is_c3d_file, C3dReader, FileFormat};

// Decode pipeline
pub mod decode;

pub use decode::{
    decode_all, decode_file, read_metadata, BatchDecoder, C3dDecoder, CaptureMetadata,
    CaptureSamples, ChannelLabelSet, DecodeOptions, DecodeOptionsBuilder, DecodedCapture,
    ForcePlateTable, MetadataIssue, MetadataValue, MotionCaptureTable, StringFallback,
    StringFallbacks, TimeSeriesTable,
};
