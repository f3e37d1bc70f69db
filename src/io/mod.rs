// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer for capture files.
//!
//! This module provides the container-level readers that the decode
//! pipeline is built on.

pub mod detection;
pub mod formats;

// Re-exports
pub use detection::{detect_format, is_c3d_file, FileFormat};
pub use formats::c3d::{C3dHeader, C3dReader, Frame, FrameLayout, FrameReader, ParameterSection};
