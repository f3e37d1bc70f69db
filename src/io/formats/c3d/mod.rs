// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! C3D container format.
//!
//! This module provides a read-only C3D implementation with:
//! - Header block decoding for all three processor families
//! - Parameter section parsing into named groups
//! - Forward-only frame record streaming

// Header block
pub mod header;

// Parameter groups
pub mod parameter;

// Frame records
pub mod frames;

// Container reader
pub mod reader;

// Re-exports
pub use frames::{Frame, FrameLayout, FrameReader};
pub use header::{C3dHeader, BLOCK_SIZE, HEADER_KEY};
pub use parameter::{Group, Parameter, ParameterData, ParameterSection};
pub use reader::C3dReader;
