// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Fallback decoding for string parameters.
//!
//! String parameters are declared as text but capture software does not
//! always write valid UTF-8. Decoding first tries UTF-8; on failure the
//! strategies registered for the field are consulted, then the default
//! chain. The default chain is:
//!
//! 1. [`KnownMisEncodings`] - exact byte sequences with a known intended
//!    spelling. The built-in table maps `b"Zhan\xE9"` to `"Zhane"`, a
//!    recurring mis-encoded operator name.
//! 2. [`Latin1`] - maps every byte to the code point of the same value.
//!    Never fails, so decoding always produces a string.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A strategy that recovers text from bytes that are not valid UTF-8.
pub trait StringFallback: fmt::Debug + Send + Sync {
    /// Strategy name used in metadata issues and logs.
    fn name(&self) -> &str;

    /// Attempt to decode `raw`. Returns `None` to defer to the next strategy.
    fn decode(&self, raw: &[u8]) -> Option<String>;
}

/// Table of exact byte sequences with a known intended spelling.
#[derive(Debug, Clone, Default)]
pub struct KnownMisEncodings {
    table: Vec<(Vec<u8>, String)>,
}

impl KnownMisEncodings {
    /// Vendor name field written as Latin-1 `é` and expected as plain ASCII.
    pub const ZHANE: (&'static [u8], &'static str) = (b"Zhan\xE9", "Zhane");

    /// Table with the built-in compatibility entries.
    pub fn builtin() -> Self {
        Self::default().with(Self::ZHANE.0, Self::ZHANE.1)
    }

    /// Add an entry.
    pub fn with(mut self, raw: &[u8], decoded: impl Into<String>) -> Self {
        self.table.push((raw.to_vec(), decoded.into()));
        self
    }
}

impl StringFallback for KnownMisEncodings {
    fn name(&self) -> &str {
        "known-mis-encoding"
    }

    fn decode(&self, raw: &[u8]) -> Option<String> {
        self.table
            .iter()
            .find(|(bytes, _)| bytes.as_slice() == raw)
            .map(|(_, decoded)| decoded.clone())
    }
}

/// ISO-8859-1 decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1;

impl StringFallback for Latin1 {
    fn name(&self) -> &str {
        "latin1"
    }

    fn decode(&self, raw: &[u8]) -> Option<String> {
        Some(raw.iter().map(|&b| b as char).collect())
    }
}

/// Result of decoding one string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// Decoded value
    pub value: String,
    /// Name of the fallback strategy used, `None` when the bytes were valid UTF-8
    pub fallback: Option<String>,
}

/// Registry of fallback strategies keyed by field name.
#[derive(Debug, Clone)]
pub struct StringFallbacks {
    by_field: HashMap<String, Vec<Arc<dyn StringFallback>>>,
    default_chain: Vec<Arc<dyn StringFallback>>,
}

impl Default for StringFallbacks {
    fn default() -> Self {
        Self {
            by_field: HashMap::new(),
            default_chain: vec![Arc::new(KnownMisEncodings::builtin()), Arc::new(Latin1)],
        }
    }
}

impl StringFallbacks {
    /// Registry with an empty default chain.
    ///
    /// Undecodable bytes then fall through to lossy UTF-8 replacement.
    pub fn empty() -> Self {
        Self {
            by_field: HashMap::new(),
            default_chain: Vec::new(),
        }
    }

    /// Register a strategy for one field, consulted before the default chain.
    ///
    /// Field names are `GROUP:PARAMETER`, compared case-insensitively.
    pub fn register(&mut self, field: &str, strategy: Arc<dyn StringFallback>) -> &mut Self {
        self.by_field
            .entry(field.to_uppercase())
            .or_default()
            .push(strategy);
        self
    }

    /// Append a strategy to the default chain.
    pub fn push_default(&mut self, strategy: Arc<dyn StringFallback>) -> &mut Self {
        self.default_chain.push(strategy);
        self
    }

    /// Decode a raw string value of `field`.
    pub fn decode(&self, field: &str, raw: &[u8]) -> DecodedText {
        if let Ok(text) = std::str::from_utf8(raw) {
            return DecodedText {
                value: text.to_string(),
                fallback: None,
            };
        }

        let field_chain = self
            .by_field
            .get(&field.to_uppercase())
            .map(|v| v.as_slice())
            .unwrap_or_default();

        for strategy in field_chain.iter().chain(self.default_chain.iter()) {
            if let Some(value) = strategy.decode(raw) {
                return DecodedText {
                    value,
                    fallback: Some(strategy.name().to_string()),
                };
            }
        }

        DecodedText {
            value: String::from_utf8_lossy(raw).into_owned(),
            fallback: Some("lossy-utf8".to_string()),
        }
    }
}
