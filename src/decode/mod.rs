// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Capture decoding pipeline.
//!
//! A decode runs three stages over one opened container:
//!
//! 1. [`metadata::extract_metadata`] reads the rates and optional fields
//! 2. [`labels::resolve_labels`] fixes the output column names
//! 3. [`sync::FrameSynchronizer`] streams the frame records once and splits
//!    them into the motion-capture and force-plate tables
//!
//! Every fatal check happens before the first frame is read. Stage 3 is
//! skipped when [`DecodeOptions::read_samples`] is false.
//!
//! # Example
//!
//! ```rust,no_run
//! use c3dcodec::{C3dDecoder, DecodeOptions};
//!
//! let decoder = C3dDecoder::new(DecodeOptions::default());
//! let capture = decoder.decode("trial01.c3d")?;
//! if let Some(samples) = &capture.samples {
//!     println!("{} frames", samples.motion.row_count());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod batch;
pub mod labels;
pub mod metadata;
pub mod options;
pub mod strings;
pub mod sync;
pub mod table;

use std::io::{Read, Seek};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::io::formats::c3d::C3dReader;
use crate::{CodecError, Result};

pub use batch::{decode_all, BatchDecoder};
pub use labels::ChannelLabelSet;
pub use metadata::{CaptureMetadata, MetadataIssue, MetadataValue};
pub use options::{DecodeOptions, DecodeOptionsBuilder};
pub use strings::{KnownMisEncodings, Latin1, StringFallback, StringFallbacks};
pub use sync::{CaptureSamples, FrameSynchronizer};
pub use table::{ForcePlateTable, MotionCaptureTable, TimeSeriesTable};

/// Everything decoded from one capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedCapture {
    /// Capture metadata
    pub metadata: CaptureMetadata,
    /// Output column names
    pub labels: ChannelLabelSet,
    /// Sample tables, `None` for a metadata-only decode
    pub samples: Option<CaptureSamples>,
}

impl DecodedCapture {
    /// Motion-capture table, when samples were decoded.
    pub fn motion(&self) -> Option<&MotionCaptureTable> {
        self.samples.as_ref().map(|s| &s.motion)
    }

    /// Force-plate table, when samples were decoded.
    pub fn force(&self) -> Option<&ForcePlateTable> {
        self.samples.as_ref().map(|s| &s.force)
    }
}

/// Decoder for C3D capture files.
#[derive(Debug, Clone, Default)]
pub struct C3dDecoder {
    options: DecodeOptions,
}

impl C3dDecoder {
    /// Create a decoder with the given options.
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode a capture file.
    pub fn decode<P: AsRef<Path>>(&self, path: P) -> Result<DecodedCapture> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CodecError::not_found(path));
        }
        debug!(path = %path.display(), "decoding capture");
        let reader = C3dReader::open(path)?;
        self.decode_container(reader)
    }

    /// Decode a capture held in any seekable source.
    pub fn decode_reader<R: Read + Seek>(&self, source: R) -> Result<DecodedCapture> {
        self.decode_container(C3dReader::from_reader(source)?)
    }

    fn decode_container<R: Read + Seek>(&self, mut reader: C3dReader<R>) -> Result<DecodedCapture> {
        let metadata = metadata::extract_metadata(&reader, &self.options)?;
        let labels = labels::resolve_labels(&reader, &self.options.string_fallbacks)?;

        if !self.options.read_samples {
            debug!("metadata-only decode, skipping frame records");
            return Ok(DecodedCapture {
                metadata,
                labels,
                samples: None,
            });
        }

        let samples_per_frame = reader.header().analog_per_frame as usize;
        let frames = reader.frames()?;
        let synchronizer = FrameSynchronizer::new(&metadata, &labels, samples_per_frame)?;
        let samples = synchronizer.synchronize(frames)?;

        Ok(DecodedCapture {
            metadata,
            labels,
            samples: Some(samples),
        })
    }
}

/// Decode a capture file with default options.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<DecodedCapture> {
    C3dDecoder::default().decode(path)
}

/// Read metadata and labels without decoding samples.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<DecodedCapture> {
    C3dDecoder::new(DecodeOptions::metadata_only()).decode(path)
}
