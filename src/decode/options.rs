// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode configuration.
//!
//! Options can be built in code with [`DecodeOptionsBuilder`] or loaded from
//! a TOML file:
//!
//! ```toml
//! read_samples = false
//! rate_ratio_tolerance = 1e-4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::strings::StringFallbacks;
use crate::{CodecError, Result};

/// Default tolerance when checking that the analog rate is an integer
/// multiple of the camera rate.
pub const DEFAULT_RATE_RATIO_TOLERANCE: f64 = 1e-6;

/// Options controlling a decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeOptions {
    /// Decode frame records; `false` yields metadata and labels only
    pub read_samples: bool,
    /// Allowed distance of `analog_rate / camera_rate` from the nearest integer
    pub rate_ratio_tolerance: f64,
    /// Fallback strategies for undecodable string parameters
    #[serde(skip)]
    pub string_fallbacks: StringFallbacks,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            read_samples: true,
            rate_ratio_tolerance: DEFAULT_RATE_RATIO_TOLERANCE,
            string_fallbacks: StringFallbacks::default(),
        }
    }
}

impl DecodeOptions {
    /// Start building options from defaults.
    pub fn builder() -> DecodeOptionsBuilder {
        DecodeOptionsBuilder::default()
    }

    /// Options for a metadata-only decode.
    pub fn metadata_only() -> Self {
        Self {
            read_samples: false,
            ..Self::default()
        }
    }

    /// Parse options from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let options: Self = toml::from_str(content)
            .map_err(|e| CodecError::format("DecodeOptions", format!("TOML parse error: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CodecError::not_found(path)
            } else {
                CodecError::format("DecodeOptions", format!("Failed to read config: {e}"))
            }
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize the serializable options to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CodecError::format("DecodeOptions", format!("TOML serialize error: {e}")))
    }

    fn validate(&self) -> Result<()> {
        if !self.rate_ratio_tolerance.is_finite() || self.rate_ratio_tolerance < 0.0 {
            return Err(CodecError::format(
                "DecodeOptions",
                format!(
                    "rate_ratio_tolerance must be a non-negative number, got {}",
                    self.rate_ratio_tolerance
                ),
            ));
        }
        Ok(())
    }
}

/// Builder for [`DecodeOptions`].
///
/// # Example
///
/// ```rust
/// use c3dcodec::DecodeOptions;
///
/// let options = DecodeOptions::builder()
///     .read_samples(false)
///     .rate_ratio_tolerance(1e-3)
///     .build()?;
/// assert!(!options.read_samples);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DecodeOptionsBuilder {
    options: DecodeOptions,
}

impl DecodeOptionsBuilder {
    /// Whether frame records are decoded.
    pub fn read_samples(mut self, read_samples: bool) -> Self {
        self.options.read_samples = read_samples;
        self
    }

    /// Tolerance for the analog/camera rate ratio.
    pub fn rate_ratio_tolerance(mut self, tolerance: f64) -> Self {
        self.options.rate_ratio_tolerance = tolerance;
        self
    }

    /// Replace the string fallback registry.
    pub fn string_fallbacks(mut self, fallbacks: StringFallbacks) -> Self {
        self.options.string_fallbacks = fallbacks;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<DecodeOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}
