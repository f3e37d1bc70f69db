// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for c3dcodec.
//!
//! Every fatal decode failure is a [`CodecError`]. Recoverable metadata
//! problems never surface here; they are recorded as
//! [`MetadataIssue`](crate::decode::metadata::MetadataIssue)s on the decoded
//! capture instead.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input path does not reference an existing file.
    NotFound,
    /// The container could not be opened or parsed.
    FormatError,
    /// Required rate or channel-label data is absent.
    MissingRequiredField,
    /// An optional metadata field was absent or unreadable (recovered, never returned).
    MalformedMetadataField,
    /// The frame stream failed partway through.
    StructuralReadError,
}

impl ErrorKind {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::FormatError => "format_error",
            ErrorKind::MissingRequiredField => "missing_required_field",
            ErrorKind::MalformedMetadataField => "malformed_metadata_field",
            ErrorKind::StructuralReadError => "structural_read_error",
        }
    }
}

/// Errors that can occur while decoding a capture file.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input path does not exist
    #[error("File not found: '{}'", path.display())]
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Container structure could not be parsed
    #[error("Format error in {context}: {message}")]
    Format {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Analog rate is not an integer multiple of the camera rate
    #[error(
        "Analog rate {analog_rate} Hz is not an integer multiple of camera rate {camera_rate} Hz"
    )]
    InvalidRateRatio {
        /// Motion-capture sample rate
        camera_rate: f64,
        /// Analog sample rate
        analog_rate: f64,
    },

    /// A required parameter is absent
    #[error("Missing required field {group}:{parameter}")]
    MissingField {
        /// Parameter group name
        group: String,
        /// Parameter name within the group
        parameter: String,
    },

    /// Frame stream ended early or contained a corrupt block
    #[error("Structural read error at frame {frame}: {message}")]
    StructuralRead {
        /// Frame number (as stored in the file) where reading failed
        frame: u32,
        /// Error message
        message: String,
    },

    /// Underlying I/O failure while opening or parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Create a format error.
    pub fn format(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::Format {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a missing required field error.
    pub fn missing(group: impl Into<String>, parameter: impl Into<String>) -> Self {
        CodecError::MissingField {
            group: group.into(),
            parameter: parameter.into(),
        }
    }

    /// Create a structural read error.
    pub fn structural(frame: u32, message: impl Into<String>) -> Self {
        CodecError::StructuralRead {
            frame,
            message: message.into(),
        }
    }

    /// Create a "not found" error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        CodecError::NotFound { path: path.into() }
    }

    /// Taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::NotFound { .. } => ErrorKind::NotFound,
            CodecError::Format { .. } | CodecError::InvalidRateRatio { .. } => {
                ErrorKind::FormatError
            }
            CodecError::MissingField { .. } => ErrorKind::MissingRequiredField,
            CodecError::StructuralRead { .. } => ErrorKind::StructuralReadError,
            CodecError::Io(err) if err.kind() == std::io::ErrorKind::NotFound => {
                ErrorKind::NotFound
            }
            CodecError::Io(_) => ErrorKind::FormatError,
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("kind", self.kind().as_str().to_string())];
        match self {
            CodecError::NotFound { path } => {
                fields.push(("path", path.display().to_string()));
            }
            CodecError::Format { context, message } => {
                fields.push(("context", context.clone()));
                fields.push(("message", message.clone()));
            }
            CodecError::InvalidRateRatio {
                camera_rate,
                analog_rate,
            } => {
                fields.push(("camera_rate", camera_rate.to_string()));
                fields.push(("analog_rate", analog_rate.to_string()));
            }
            CodecError::MissingField { group, parameter } => {
                fields.push(("group", group.clone()));
                fields.push(("parameter", parameter.clone()));
            }
            CodecError::StructuralRead { frame, message } => {
                fields.push(("frame", frame.to_string()));
                fields.push(("message", message.clone()));
            }
            CodecError::Io(err) => fields.push(("message", err.to_string())),
        }
        fields
    }
}

/// Result type for c3dcodec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
