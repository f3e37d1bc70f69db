// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Capture metadata extraction.
//!
//! Reads the named parameter groups a capture carries besides its samples.
//! Only the two sample rates are required; every other field is optional
//! and degrades to `None` when its group or parameter is missing, empty,
//! or stored with an unexpected type. Each such recovery is recorded as a
//! [`MetadataIssue`] so callers can audit it.
//!
//! | group                  | parameters                                   |
//! |------------------------|----------------------------------------------|
//! | `SSCDATAANDPROCESSING` | `DATEOFCAPTURE USER VERSION DESCRIPTION NOTE` |
//! | `PROCESSING`           | `BODYMASS HEIGHT`                            |
//! | `SUBJECTS`             | `NAMES`                                      |
//! | `TRIAL`                | `CAMERA_RATE` (required)                     |
//! | `ANALOG`               | `RATE` (required)                            |
//! | `FORCE_PLATFORM`       | `CORNERS`                                    |
//! | `POINT`                | `UNITS`                                      |

use std::collections::HashSet;
use std::io::{Read, Seek};

use serde::Serialize;
use tracing::{debug, warn};

use super::options::DecodeOptions;
use super::strings::StringFallbacks;
use crate::core::Processor;
use crate::io::formats::c3d::{C3dReader, Parameter, ParameterSection};
use crate::{CodecError, Result};

/// Provenance group written by the capture software.
pub const PROVENANCE_GROUP: &str = "SSCDATAANDPROCESSING";
/// Provenance string parameters, in the order they are reported.
pub const PROVENANCE_FIELDS: [&str; 5] = ["DATEOFCAPTURE", "USER", "VERSION", "DESCRIPTION", "NOTE"];

/// A recovered problem with an optional metadata field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataIssue {
    /// `GROUP` or `GROUP:PARAMETER`
    pub field: String,
    /// What was wrong and how it was recovered
    pub reason: String,
}

/// A metadata value viewed generically.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Field not present in the capture
    Absent,
    /// Scalar number
    Number(f64),
    /// Numeric list
    Numbers(Vec<f64>),
    /// String list
    Text(Vec<String>),
}

impl From<Option<f64>> for MetadataValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(MetadataValue::Absent, MetadataValue::Number)
    }
}

impl From<Option<Vec<String>>> for MetadataValue {
    fn from(value: Option<Vec<String>>) -> Self {
        value.map_or(MetadataValue::Absent, MetadataValue::Text)
    }
}

/// Metadata of one capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureMetadata {
    /// `SSCDATAANDPROCESSING:DATEOFCAPTURE`
    pub date_of_capture: Option<Vec<String>>,
    /// `SSCDATAANDPROCESSING:USER`
    pub user: Option<Vec<String>>,
    /// `SSCDATAANDPROCESSING:VERSION`
    pub version: Option<Vec<String>>,
    /// `SSCDATAANDPROCESSING:DESCRIPTION`
    pub description: Option<Vec<String>>,
    /// `SSCDATAANDPROCESSING:NOTE`
    pub note: Option<Vec<String>>,
    /// `PROCESSING:BODYMASS`
    pub body_mass: Option<f64>,
    /// `PROCESSING:HEIGHT`
    pub height: Option<f64>,
    /// `SUBJECTS:NAMES`
    pub subject_names: Option<Vec<String>>,
    /// Motion-capture sample rate in Hz
    pub camera_rate: f64,
    /// Analog sample rate in Hz
    pub analog_rate: f64,
    /// Analog samples per motion-capture frame
    pub frequency_ratio: usize,
    /// Mean corner X-coordinate of each force plate
    pub plate_midpoints_x: Vec<f64>,
    /// First frame number
    pub first_frame: u32,
    /// Last frame number
    pub last_frame: u32,
    /// Points stored per frame
    pub point_count: usize,
    /// Analog channels stored per sub-sample
    pub analog_channel_count: usize,
    /// `POINT:UNITS`
    pub point_units: Option<String>,
    /// Processor family the file was written with
    pub processor: Processor,
    /// Recovered problems with optional fields
    pub issues: Vec<MetadataIssue>,
}

impl CaptureMetadata {
    /// Number of frames between `first_frame` and `last_frame` inclusive.
    pub fn frame_count(&self) -> usize {
        if self.last_frame < self.first_frame {
            0
        } else {
            (self.last_frame - self.first_frame) as usize + 1
        }
    }

    /// Field-name → value view of the record.
    pub fn fields(&self) -> Vec<(&'static str, MetadataValue)> {
        vec![
            ("DATEOFCAPTURE", self.date_of_capture.clone().into()),
            ("USER", self.user.clone().into()),
            ("VERSION", self.version.clone().into()),
            ("DESCRIPTION", self.description.clone().into()),
            ("NOTE", self.note.clone().into()),
            ("BODYMASS", self.body_mass.into()),
            ("HEIGHT", self.height.into()),
            ("NAMES", self.subject_names.clone().into()),
            ("CAMERA_RATE", MetadataValue::Number(self.camera_rate)),
            ("ANALOG_RATE", MetadataValue::Number(self.analog_rate)),
            (
                "PLATE_MIDPOINTS_X",
                MetadataValue::Numbers(self.plate_midpoints_x.clone()),
            ),
        ]
    }
}

/// Field reader that records recoveries instead of failing.
struct FieldReader<'a> {
    parameters: &'a ParameterSection,
    fallbacks: &'a StringFallbacks,
    issues: Vec<MetadataIssue>,
    reported_groups: HashSet<&'static str>,
}

impl<'a> FieldReader<'a> {
    fn new(parameters: &'a ParameterSection, fallbacks: &'a StringFallbacks) -> Self {
        Self {
            parameters,
            fallbacks,
            issues: Vec::new(),
            reported_groups: HashSet::new(),
        }
    }

    fn issue(&mut self, field: String, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(field = %field, reason = %reason, "recovered malformed metadata field");
        self.issues.push(MetadataIssue { field, reason });
    }

    /// Look up an optional parameter, noting absence once per group.
    fn lookup(&mut self, group: &'static str, name: &str) -> Option<&'a Parameter> {
        let Some(g) = self.parameters.group(group) else {
            if self.reported_groups.insert(group) {
                debug!(group, "optional group absent");
                self.issues.push(MetadataIssue {
                    field: group.to_string(),
                    reason: "group absent".to_string(),
                });
            }
            return None;
        };
        let parameter = g.get(name);
        if parameter.is_none() {
            debug!(group, parameter = name, "optional parameter absent");
            self.issues.push(MetadataIssue {
                field: format!("{group}:{name}"),
                reason: "parameter absent".to_string(),
            });
        }
        parameter.filter(|p| !p.is_empty())
    }

    fn strings(&mut self, group: &'static str, name: &str) -> Option<Vec<String>> {
        let parameter = self.lookup(group, name)?;
        let field = format!("{group}:{name}");
        let Some(raw) = parameter.raw_strings() else {
            self.issue(
                field,
                format!("expected char data, found {}", parameter.data().type_name()),
            );
            return None;
        };

        let mut out = Vec::with_capacity(raw.len());
        for bytes in raw {
            let decoded = self.fallbacks.decode(&field, bytes);
            if let Some(strategy) = decoded.fallback {
                self.issue(
                    field.clone(),
                    format!("invalid UTF-8, decoded with {strategy} fallback"),
                );
            }
            out.push(decoded.value);
        }
        Some(out)
    }

    fn number(&mut self, group: &'static str, name: &str) -> Option<f64> {
        let parameter = self.lookup(group, name)?;
        let value = parameter.as_f64();
        if value.is_none() {
            self.issue(
                format!("{group}:{name}"),
                format!("expected numeric data, found {}", parameter.data().type_name()),
            );
        }
        value
    }

    fn plate_midpoints(&mut self) -> Vec<f64> {
        let Some(corners) = self.lookup("FORCE_PLATFORM", "CORNERS") else {
            return Vec::new();
        };
        match plate_midpoints_x(corners) {
            Ok(midpoints) => midpoints,
            Err(reason) => {
                self.issue("FORCE_PLATFORM:CORNERS".to_string(), reason);
                Vec::new()
            }
        }
    }
}

/// Mean X-coordinate of each plate's four corners.
///
/// `CORNERS` has dimensions `[3, 4, plates]` with the axis varying fastest,
/// so the X of corner `c` on plate `p` sits at index `3c + 12p`.
pub fn plate_midpoints_x(corners: &Parameter) -> std::result::Result<Vec<f64>, String> {
    let dims = corners.dimensions();
    if dims.len() < 2 || dims[0] != 3 || dims[1] != 4 {
        return Err(format!("expected dimensions [3, 4, plates], found {dims:?}"));
    }
    let plates = dims.get(2).copied().unwrap_or(1);
    let values = corners
        .as_f64_vec()
        .ok_or_else(|| format!("expected numeric data, found {}", corners.data().type_name()))?;
    if values.len() < plates * 12 {
        return Err(format!(
            "{} values cannot describe {plates} plates",
            values.len()
        ));
    }

    Ok((0..plates)
        .map(|p| (0..4).map(|c| values[12 * p + 3 * c]).sum::<f64>() / 4.0)
        .collect())
}

/// Read a required, strictly positive rate.
fn required_rate(parameters: &ParameterSection, group: &str, name: &str) -> Result<f64> {
    let rate = parameters
        .get(group, name)
        .and_then(|p| p.as_f64())
        .ok_or_else(|| CodecError::missing(group, name))?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(CodecError::format(
            "extract_metadata",
            format!("{group}:{name} must be positive, found {rate}"),
        ));
    }
    Ok(rate)
}

/// Integer number of analog samples per camera frame.
///
/// Fails with [`CodecError::InvalidRateRatio`] when the analog rate is not
/// within `tolerance` of an integer multiple of the camera rate.
pub fn frequency_ratio(camera_rate: f64, analog_rate: f64, tolerance: f64) -> Result<usize> {
    let exact = analog_rate / camera_rate;
    let rounded = exact.round();
    if rounded < 1.0 || (exact - rounded).abs() > tolerance {
        return Err(CodecError::InvalidRateRatio {
            camera_rate,
            analog_rate,
        });
    }
    Ok(rounded as usize)
}

/// Extract capture metadata from an opened container.
pub fn extract_metadata<R: Read + Seek>(
    reader: &C3dReader<R>,
    options: &DecodeOptions,
) -> Result<CaptureMetadata> {
    let parameters = reader.parameters();

    let camera_rate = required_rate(parameters, "TRIAL", "CAMERA_RATE")?;
    let analog_rate = required_rate(parameters, "ANALOG", "RATE")?;
    let frequency_ratio = frequency_ratio(camera_rate, analog_rate, options.rate_ratio_tolerance)?;
    let samples_per_frame = reader.header().analog_per_frame as usize;
    if samples_per_frame != frequency_ratio {
        return Err(CodecError::format(
            "extract_metadata",
            format!(
                "header stores {samples_per_frame} analog samples per frame but the rates imply {frequency_ratio}"
            ),
        ));
    }

    let mut fields = FieldReader::new(parameters, &options.string_fallbacks);

    let [date_of_capture, user, version, description, note] =
        PROVENANCE_FIELDS.map(|name| fields.strings(PROVENANCE_GROUP, name));
    let body_mass = fields.number("PROCESSING", "BODYMASS");
    let height = fields.number("PROCESSING", "HEIGHT");
    let subject_names = fields.strings("SUBJECTS", "NAMES");
    let point_units = fields
        .strings("POINT", "UNITS")
        .and_then(|units| units.into_iter().next());
    let plate_midpoints_x = fields.plate_midpoints();

    let (first_frame, last_frame) = reader.frame_range();
    let header = reader.header();

    debug!(
        camera_rate,
        analog_rate,
        frequency_ratio,
        plates = plate_midpoints_x.len(),
        issues = fields.issues.len(),
        "extracted capture metadata"
    );

    Ok(CaptureMetadata {
        date_of_capture,
        user,
        version,
        description,
        note,
        body_mass,
        height,
        subject_names,
        camera_rate,
        analog_rate,
        frequency_ratio,
        plate_midpoints_x,
        first_frame,
        last_frame,
        point_count: header.point_count as usize,
        analog_channel_count: header.analog_channels(),
        point_units,
        processor: reader.processor(),
        issues: fields.issues,
    })
}
