// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! File format implementations for biomechanics capture data.
//!
//! - [`c3d`]: C3D container support

pub mod c3d;
