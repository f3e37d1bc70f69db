// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode command - split one capture into tables.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::common::{print_table_head, Result};
use c3dcodec::{C3dDecoder, DecodeOptions};

/// Decode one capture.
#[derive(Args, Clone, Debug)]
pub struct DecodeCmd {
    /// Input capture
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Write the decoded capture as JSON
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Rows of each table to print
    #[arg(long, default_value_t = 5)]
    head: usize,
}

impl DecodeCmd {
    pub fn run(self, options: DecodeOptions) -> Result<()> {
        let capture = C3dDecoder::new(options).decode(&self.input)?;

        println!("=== {} ===", self.input.display());
        match &capture.samples {
            Some(samples) => {
                print_table_head("Motion capture", &samples.motion, self.head);
                println!();
                print_table_head("Force plate", &samples.force, self.head);
            }
            None => println!("Samples not decoded (read_samples = false)"),
        }

        if let Some(output) = &self.output {
            let file = File::create(output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            serde_json::to_writer(BufWriter::new(file), &capture)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!();
            println!("Wrote {}", output.display());
        }

        Ok(())
    }
}
