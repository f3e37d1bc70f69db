// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - show capture metadata and channel labels.

use std::path::PathBuf;

use clap::Subcommand;

use crate::common::{format_seconds, Result};
use c3dcodec::io::formats::c3d::ParameterData;
use c3dcodec::{C3dDecoder, C3dReader, DecodeOptions, MetadataValue};

/// Inspect capture contents without decoding samples.
#[derive(Subcommand, Clone, Debug)]
pub enum InspectCmd {
    /// Show rates, frame range, subject and force plates
    Info {
        /// Input capture
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// List motion-capture and analog channels
    Channels {
        /// Input capture
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Dump the raw parameter section
    Parameters {
        /// Input capture
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only show this group
        #[arg(short, long)]
        group: Option<String>,
    },
}

impl InspectCmd {
    pub fn run(self, options: DecodeOptions) -> Result<()> {
        let options = DecodeOptions {
            read_samples: false,
            ..options
        };
        let decoder = C3dDecoder::new(options);
        match self {
            InspectCmd::Info { input } => cmd_info(&decoder, input),
            InspectCmd::Channels { input } => cmd_channels(&decoder, input),
            InspectCmd::Parameters { input, group } => cmd_parameters(input, group),
        }
    }
}

fn display_value(value: &MetadataValue) -> String {
    match value {
        MetadataValue::Absent => "-".to_string(),
        MetadataValue::Number(n) => n.to_string(),
        MetadataValue::Numbers(v) if v.is_empty() => "-".to_string(),
        MetadataValue::Numbers(v) => v
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        MetadataValue::Text(v) if v.is_empty() => "-".to_string(),
        MetadataValue::Text(v) => v.join(", "),
    }
}

/// Cmd: Show capture info
fn cmd_info(decoder: &C3dDecoder, input: PathBuf) -> Result<()> {
    let capture = decoder.decode(&input)?;
    let meta = &capture.metadata;

    println!("=== {} ===", input.display());
    println!("Processor: {}", meta.processor.as_str());
    println!("Camera rate: {} Hz", meta.camera_rate);
    println!("Analog rate: {} Hz", meta.analog_rate);
    println!("Frequency ratio: {}", meta.frequency_ratio);
    println!(
        "Frames: {}..={} ({})",
        meta.first_frame,
        meta.last_frame,
        meta.frame_count()
    );
    println!(
        "Duration: {}",
        format_seconds(meta.frame_count() as f64 / meta.camera_rate)
    );
    println!("Markers: {}", capture.labels.marker_count());
    println!("Analog channels: {}", capture.labels.analog.len());
    if let Some(units) = &meta.point_units {
        println!("Point units: {units}");
    }

    println!();
    for (name, value) in meta.fields() {
        println!("{name}: {}", display_value(&value));
    }

    if !meta.plate_midpoints_x.is_empty() {
        println!();
        println!("Force plates:");
        for (i, x) in meta.plate_midpoints_x.iter().enumerate() {
            println!("  [{}] midpoint x = {x}", i + 1);
        }
    }

    if !meta.issues.is_empty() {
        println!();
        println!("Metadata issues:");
        for issue in &meta.issues {
            println!("  {}: {}", issue.field, issue.reason);
        }
    }

    Ok(())
}

/// Cmd: List channels
fn cmd_channels(decoder: &C3dDecoder, input: PathBuf) -> Result<()> {
    let capture = decoder.decode(&input)?;

    println!("=== Channels in {} ===", input.display());
    println!();
    println!("Motion ({}):", capture.labels.motion.len());
    for label in &capture.labels.motion {
        println!("  {label}");
    }
    println!();
    println!("Analog ({}):", capture.labels.analog.len());
    for label in &capture.labels.analog {
        println!("  {label}");
    }

    Ok(())
}

fn display_data(data: &ParameterData) -> String {
    const MAX: usize = 8;
    fn list<T: ToString>(values: &[T]) -> String {
        let shown: Vec<String> = values.iter().take(MAX).map(|v| v.to_string()).collect();
        if values.len() > MAX {
            format!("[{}, ... {} more]", shown.join(", "), values.len() - MAX)
        } else {
            format!("[{}]", shown.join(", "))
        }
    }

    match data {
        ParameterData::Char(bytes) => format!("{:?}", String::from_utf8_lossy(bytes).trim_end()),
        ParameterData::Byte(v) => list(v),
        ParameterData::Int16(v) => list(v),
        ParameterData::Float(v) => list(v),
    }
}

/// Cmd: Dump parameter groups
fn cmd_parameters(input: PathBuf, group: Option<String>) -> Result<()> {
    let reader = C3dReader::open(&input)?;
    let section = reader.parameters();

    let mut groups: Vec<_> = section
        .groups()
        .filter(|g| group.as_ref().map_or(true, |name| g.name.eq_ignore_ascii_case(name)))
        .collect();
    groups.sort_by(|a, b| a.name.cmp(&b.name));

    println!("=== Parameters in {} ===", input.display());
    println!("Processor: {}", reader.processor().as_str());
    for g in groups {
        println!();
        println!("{} ({})", g.name, g.description);

        let mut parameters: Vec<_> = g.parameters().collect();
        parameters.sort_by(|a, b| a.name.cmp(&b.name));
        for p in parameters {
            println!(
                "  {:<20} {:<5} {:?} {}",
                p.name,
                p.data().type_name(),
                p.dimensions(),
                display_data(p.data())
            );
        }
    }

    Ok(())
}
