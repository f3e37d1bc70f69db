// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Parallel decoding of many captures.
//!
//! Each file is decoded independently on a rayon worker. Results come back
//! in input order, one per path, so a failing file never hides the others.

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, warn};

use super::{C3dDecoder, DecodeOptions, DecodedCapture};
use crate::{CodecError, Result};

/// Decode every path on the global rayon pool.
pub fn decode_all<P>(paths: &[P], options: &DecodeOptions) -> Vec<Result<DecodedCapture>>
where
    P: AsRef<Path> + Sync,
{
    let decoder = C3dDecoder::new(options.clone());
    paths
        .par_iter()
        .map(|path| decode_logged(&decoder, path.as_ref()))
        .collect()
}

fn decode_logged(decoder: &C3dDecoder, path: &Path) -> Result<DecodedCapture> {
    let result = decoder.decode(path);
    if let Err(err) = &result {
        warn!(path = %path.display(), fields = ?err.log_fields(), "decode failed: {err}");
    }
    result
}

/// Batch decoder with a dedicated thread pool and completion callback.
#[derive(Debug, Clone, Default)]
pub struct BatchDecoder {
    decoder: C3dDecoder,
    num_threads: Option<usize>,
}

impl BatchDecoder {
    /// Create a batch decoder using the given options.
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            decoder: C3dDecoder::new(options),
            num_threads: None,
        }
    }

    /// Limit the number of worker threads. `0` uses rayon's default.
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = (num_threads > 0).then_some(num_threads);
        self
    }

    /// Decode every path, calling `on_done` as each file finishes.
    ///
    /// `on_done` receives the input index and the result; calls arrive in
    /// completion order. The returned vector is in input order.
    pub fn decode_each<P, F>(&self, paths: &[P], on_done: F) -> Result<Vec<Result<DecodedCapture>>>
    where
        P: AsRef<Path> + Sync,
        F: Fn(usize, &Result<DecodedCapture>) + Send + Sync,
    {
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|index| format!("c3d-decoder-{index}"));
        if let Some(n) = self.num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder.build().map_err(|e| {
            CodecError::format("BatchDecoder", format!("Failed to create thread pool: {e}"))
        })?;

        debug!(files = paths.len(), threads = pool.current_num_threads(), "starting batch decode");

        let decoder = &self.decoder;
        let on_done = &on_done;
        Ok(pool.install(|| {
            paths
                .par_iter()
                .enumerate()
                .map(|(index, path)| {
                    let result = decode_logged(decoder, path.as_ref());
                    on_done(index, &result);
                    result
                })
                .collect()
        }))
    }

    /// Decode every path without a callback.
    pub fn decode_all<P>(&self, paths: &[P]) -> Result<Vec<Result<DecodedCapture>>>
    where
        P: AsRef<Path> + Sync,
    {
        self.decode_each(paths, |_, _| {})
    }
}
