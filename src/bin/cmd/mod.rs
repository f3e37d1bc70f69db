// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod batch;
mod decode;
mod inspect;

pub use batch::BatchCmd;
pub use decode::DecodeCmd;
pub use inspect::InspectCmd;
