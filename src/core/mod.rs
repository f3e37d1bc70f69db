// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout c3dcodec.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Decode error taxonomy
//! - [`Processor`] - Byte-order family a capture was written with

pub mod error;
pub mod processor;

pub use error::{CodecError, ErrorKind, Result};
pub use processor::Processor;
