// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Batch command - decode many captures in parallel.

use std::path::PathBuf;

use clap::Args;

use crate::common::{ProgressBar, Result};
use c3dcodec::{BatchDecoder, DecodeOptions};

/// Decode many captures.
#[derive(Args, Clone, Debug)]
pub struct BatchCmd {
    /// Input captures
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Worker threads (0 = one per core)
    #[arg(short = 'j', long, default_value_t = 0)]
    jobs: usize,
}

impl BatchCmd {
    pub fn run(self, options: DecodeOptions) -> Result<()> {
        let progress = ProgressBar::new(self.inputs.len() as u64, "Decoding");
        let results = BatchDecoder::new(options)
            .with_threads(self.jobs)
            .decode_each(self.inputs.as_slice(), |_, _| progress.inc())?;

        let mut failed = 0usize;
        for (input, result) in self.inputs.iter().zip(&results) {
            match result {
                Ok(capture) => {
                    let (frames, analog_rows) = capture
                        .samples
                        .as_ref()
                        .map(|s| (s.motion.row_count(), s.force.row_count()))
                        .unwrap_or_default();
                    println!(
                        "ok    {}  {frames} frames, {analog_rows} analog rows",
                        input.display()
                    );
                }
                Err(e) => {
                    failed += 1;
                    println!("FAIL  {}  [{}] {e}", input.display(), e.kind().as_str());
                }
            }
        }
        progress.finish_with_message(format!("{} decoded, {failed} failed", results.len() - failed));

        if failed > 0 {
            anyhow::bail!("{failed} of {} files failed to decode", results.len());
        }
        Ok(())
    }
}
