// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! End-to-end decode tests on synthetic captures.

mod common;

use std::io::Cursor;

use c3dcodec::decode::sync::SIGN_CORRECTED_CHANNELS;
use c3dcodec::{
    decode_all, decode_file, read_metadata, C3dDecoder, CodecError, DecodeOptions, DecodedCapture,
    ErrorKind, Processor,
};
use common::{CaptureFixture, DEC, MIPS};

fn decode(fixture: &CaptureFixture) -> c3dcodec::Result<DecodedCapture> {
    C3dDecoder::default().decode_reader(Cursor::new(fixture.to_bytes()))
}

/// Check every cell of both tables against the fixture's generated values.
fn assert_samples_match(capture: &DecodedCapture, fixture: &CaptureFixture) {
    let samples = capture.samples.as_ref().expect("samples decoded");
    let motion = &samples.motion;
    let force = &samples.force;

    assert_eq!(motion.row_count(), fixture.frames);
    for frame in 0..fixture.frames {
        for marker in 0..fixture.markers.len() {
            for axis in 0..3 {
                assert_eq!(
                    motion.value(frame, marker * 3 + axis),
                    Some(fixture.expected_point(frame, marker, axis)),
                    "motion frame {frame} marker {marker} axis {axis}"
                );
            }
        }
    }

    let ratio = fixture.ratio();
    assert_eq!(force.row_count(), fixture.frames * ratio);
    for (channel, name) in force.columns().iter().enumerate() {
        let sign = if SIGN_CORRECTED_CHANNELS.contains(&name.as_str()) {
            -1.0
        } else {
            1.0
        };
        for row in 0..force.row_count() {
            assert_eq!(
                force.value(row, channel),
                Some(sign * fixture.expected_analog(row, channel)),
                "analog row {row} channel {name}"
            );
        }
    }
}

// ============================================================================
// Reference scenario
// ============================================================================

#[test]
fn test_reference_scenario_shapes_and_times() {
    let fixture = CaptureFixture::default();
    let capture = decode(&fixture).unwrap();
    let samples = capture.samples.as_ref().unwrap();

    assert_eq!(samples.motion.row_count(), 50);
    assert_eq!(samples.force.row_count(), 500);
    assert_eq!(samples.motion.time()[..3], [0.0, 0.01, 0.02]);
    assert_eq!(samples.force.time()[..3], [0.0, 0.001, 0.002]);
    assert_eq!(samples.motion.time()[49], 0.49);
    assert_eq!(samples.force.time()[499], 0.499);
}

#[test]
fn test_reference_scenario_labels() {
    let capture = decode(&CaptureFixture::default()).unwrap();

    assert_eq!(
        capture.labels.motion,
        vec!["LHEE_x", "LHEE_y", "LHEE_z", "RTOE_x", "RTOE_y", "RTOE_z"]
    );
    assert_eq!(
        capture.labels.analog,
        vec!["Fx1", "Fy1", "Fz1", "Mx1", "My1", "Mz1", "Fx2", "Fy2", "Fz2", "Mx2", "My2", "Mz2"]
    );

    let samples = capture.samples.as_ref().unwrap();
    assert_eq!(samples.motion.columns(), capture.labels.motion.as_slice());
    assert_eq!(samples.force.columns(), capture.labels.analog.as_slice());
}

#[test]
fn test_reference_scenario_values_and_sign_correction() {
    let fixture = CaptureFixture::default();
    let capture = decode(&fixture).unwrap();
    assert_samples_match(&capture, &fixture);

    let force = capture.force().unwrap();
    let fz1 = force.column_index("Fz1").unwrap();
    let mz1 = force.column_index("Mz1").unwrap();
    assert_eq!(force.value(3, fz1), Some(-fixture.expected_analog(3, fz1)));
    assert_eq!(force.value(3, mz1), Some(fixture.expected_analog(3, mz1)));
}

#[test]
fn test_reference_scenario_metadata() {
    let capture = decode(&CaptureFixture::default()).unwrap();
    let meta = &capture.metadata;

    assert_eq!(meta.camera_rate, 100.0);
    assert_eq!(meta.analog_rate, 1000.0);
    assert_eq!(meta.frequency_ratio, 10);
    assert_eq!(meta.first_frame, 1);
    assert_eq!(meta.last_frame, 50);
    assert_eq!(meta.point_count, 2);
    assert_eq!(meta.analog_channel_count, 12);
    assert_eq!(meta.processor, Processor::Intel);
    assert_eq!(meta.user, Some(vec!["operator".to_string()]));
    assert_eq!(meta.date_of_capture, Some(vec!["2024-03-18".to_string()]));
    assert_eq!(meta.subject_names, Some(vec!["S01".to_string()]));
    assert_eq!(meta.body_mass, Some(72.5));
    assert_eq!(meta.height, Some(1.75));
    assert_eq!(meta.point_units.as_deref(), Some("mm"));
    assert_eq!(meta.plate_midpoints_x, vec![250.0, 750.0]);
}

#[test]
fn test_analog_rows_are_ratio_times_frames() {
    for (camera, analog, frames) in [(100.0, 1000.0, 50), (250.0, 500.0, 17), (60.0, 60.0, 9)] {
        let fixture = CaptureFixture {
            camera_rate: Some(camera),
            analog_rate: Some(analog),
            frames,
            ..CaptureFixture::default()
        };
        let capture = decode(&fixture).unwrap();
        let samples = capture.samples.unwrap();
        assert_eq!(
            samples.force.row_count(),
            samples.motion.row_count() * capture.metadata.frequency_ratio
        );
    }
}

#[test]
fn test_time_axes_stay_aligned() {
    let fixture = CaptureFixture {
        frames: 400,
        ..CaptureFixture::default()
    };
    let capture = decode(&fixture).unwrap();
    let samples = capture.samples.as_ref().unwrap();
    let ratio = capture.metadata.frequency_ratio;
    let analog_period = 1.0 / capture.metadata.analog_rate;
    let camera_period = 1.0 / capture.metadata.camera_rate;

    let last = samples.motion.row_count() - 1;
    let last_motion_time = samples.motion.time()[last];
    let aligned_analog_time = samples.force.time()[last * ratio];
    assert!((aligned_analog_time - last_motion_time).abs() < analog_period);

    let last_analog_time = *samples.force.time().last().unwrap();
    assert!(last_analog_time >= last_motion_time);
    assert!(last_analog_time - last_motion_time < camera_period);
}

#[test]
fn test_first_frame_offset_starts_time_at_zero() {
    let fixture = CaptureFixture {
        first_frame: 10,
        frames: 5,
        ..CaptureFixture::default()
    };
    let capture = decode(&fixture).unwrap();
    assert_eq!(capture.metadata.first_frame, 10);
    assert_eq!(capture.metadata.last_frame, 14);
    assert_eq!(capture.motion().unwrap().time()[0], 0.0);
    assert_samples_match(&capture, &fixture);
}

#[test]
fn test_actual_frame_fields_override_header() {
    let fixture = CaptureFixture {
        actual_range: Some((1, 40)),
        ..CaptureFixture::default()
    };
    let capture = decode(&fixture).unwrap();
    assert_eq!(capture.metadata.last_frame, 40);
    assert_eq!(capture.motion().unwrap().row_count(), 40);
    assert_eq!(capture.force().unwrap().row_count(), 400);
}

#[test]
fn test_frame_range_beyond_data_section() {
    let fixture = CaptureFixture {
        actual_range: Some((1, u32::MAX)),
        ..CaptureFixture::default()
    };
    let err = decode(&fixture).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralReadError);
    assert!(matches!(err, CodecError::StructuralRead { frame: 51, .. }));

    // Metadata alone does not touch frame records.
    let capture = C3dDecoder::new(DecodeOptions::metadata_only())
        .decode_reader(Cursor::new(fixture.to_bytes()))
        .unwrap();
    assert_eq!(capture.metadata.last_frame, u32::MAX);
}

#[test]
fn test_corrupt_frame_range_does_not_sink_batch() {
    let dir = tempfile::tempdir().unwrap();
    let good = CaptureFixture::default().write(dir.path(), "good.c3d");
    let bad = CaptureFixture {
        actual_range: Some((1, u32::MAX)),
        ..CaptureFixture::default()
    }
    .write(dir.path(), "bad.c3d");

    let results = decode_all(&[bad, good], &DecodeOptions::default());
    assert_eq!(
        results[0].as_ref().unwrap_err().kind(),
        ErrorKind::StructuralReadError
    );
    assert_eq!(results[1].as_ref().unwrap().motion().unwrap().row_count(), 50);
}

#[test]
fn test_frame_range_ending_at_u32_max() {
    let fixture = CaptureFixture {
        frames: 1,
        actual_range: Some((u32::MAX, u32::MAX)),
        ..CaptureFixture::default()
    };
    let capture = decode(&fixture).unwrap();
    assert_eq!(capture.metadata.first_frame, u32::MAX);
    assert_eq!(capture.metadata.frame_count(), 1);
    assert_eq!(capture.force().unwrap().row_count(), 10);
    assert_samples_match(&capture, &fixture);
}

// ============================================================================
// Storage formats
// ============================================================================

#[test]
fn test_integer_storage_scaling() {
    let fixture = CaptureFixture {
        float_storage: false,
        point_scale: 0.25,
        analog_scale: Some(vec![0.5; 12]),
        analog_offset: Some((0..12).map(|c| c as i16 * 3).collect()),
        gen_scale: 2.0,
        ..CaptureFixture::default()
    };
    let capture = decode(&fixture).unwrap();
    assert_samples_match(&capture, &fixture);

    let motion = capture.motion().unwrap();
    assert_eq!(motion.value(1, 0), Some(4.0 * 0.25));
}

#[test]
fn test_processor_families_decode_identically() {
    for float_storage in [true, false] {
        let reference = decode(&CaptureFixture {
            float_storage,
            ..CaptureFixture::default()
        })
        .unwrap();

        for (processor, expected) in [(DEC, Processor::Dec), (MIPS, Processor::Mips)] {
            let fixture = CaptureFixture {
                processor,
                float_storage,
                ..CaptureFixture::default()
            };
            let capture = decode(&fixture).unwrap();
            assert_eq!(capture.metadata.processor, expected);
            assert_eq!(capture.samples, reference.samples, "processor {processor}");
            assert_eq!(capture.metadata.body_mass, Some(72.5));
            assert_eq!(capture.metadata.plate_midpoints_x, vec![250.0, 750.0]);
        }
    }
}

#[test]
fn test_unknown_processor_rejected() {
    let mut bytes = CaptureFixture::default().to_bytes();
    bytes[512 + 3] = 99;
    let err = C3dDecoder::default()
        .decode_reader(Cursor::new(bytes))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatError);
}

#[test]
fn test_bad_header_key_rejected() {
    let mut bytes = CaptureFixture::default().to_bytes();
    bytes[1] = 0x00;
    let err = C3dDecoder::default()
        .decode_reader(Cursor::new(bytes))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatError);
}

// ============================================================================
// Optional metadata
// ============================================================================

#[test]
fn test_missing_optional_groups() {
    let populated = decode(&CaptureFixture::default()).unwrap();
    let fixture = CaptureFixture {
        user: None,
        date_of_capture: None,
        subject_names: None,
        body_mass: None,
        height: None,
        plate_corner_x: None,
        ..CaptureFixture::default()
    };
    let capture = decode(&fixture).unwrap();
    let meta = &capture.metadata;

    assert_eq!(meta.user, None);
    assert_eq!(meta.date_of_capture, None);
    assert_eq!(meta.note, None);
    assert_eq!(meta.subject_names, None);
    assert_eq!(meta.body_mass, None);
    assert_eq!(meta.height, None);
    assert!(meta.plate_midpoints_x.is_empty());
    for group in ["SUBJECTS", "SSCDATAANDPROCESSING", "PROCESSING", "FORCE_PLATFORM"] {
        assert!(
            meta.issues.iter().any(|i| i.field == group),
            "no issue recorded for {group}"
        );
    }

    assert_eq!(capture.samples, populated.samples);
    assert_eq!(capture.labels, populated.labels);
}

#[test]
fn test_known_mis_encoding_user() {
    let fixture = CaptureFixture {
        user: Some(b"Zhan\xE9".to_vec()),
        ..CaptureFixture::default()
    };
    let capture = decode(&fixture).unwrap();
    assert_eq!(capture.metadata.user, Some(vec!["Zhane".to_string()]));
    assert!(capture
        .metadata
        .issues
        .iter()
        .any(|i| i.field == "SSCDATAANDPROCESSING:USER" && i.reason.contains("known-mis-encoding")));
}

#[test]
fn test_latin1_fallback_user() {
    let fixture = CaptureFixture {
        user: Some(b"Ren\xE9e".to_vec()),
        ..CaptureFixture::default()
    };
    let capture = decode(&fixture).unwrap();
    assert_eq!(capture.metadata.user, Some(vec!["Renée".to_string()]));
}

// ============================================================================
// Fatal errors
// ============================================================================

#[test]
fn test_zero_analog_labels() {
    let fixture = CaptureFixture {
        analog_labels: Vec::new(),
        ..CaptureFixture::default()
    };
    let err = decode(&fixture).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
    assert!(matches!(
        err,
        CodecError::MissingField { ref group, ref parameter } if group == "ANALOG" && parameter == "LABELS"
    ));
}

#[test]
fn test_missing_camera_rate() {
    let fixture = CaptureFixture {
        camera_rate: None,
        ..CaptureFixture::default()
    };
    let err = decode(&fixture).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
    assert!(err.to_string().contains("TRIAL:CAMERA_RATE"));
}

#[test]
fn test_missing_analog_rate() {
    let fixture = CaptureFixture {
        analog_rate: None,
        ..CaptureFixture::default()
    };
    let err = decode(&fixture).unwrap_err();
    assert!(err.to_string().contains("ANALOG:RATE"));
}

#[test]
fn test_non_integral_rate_ratio_rejected() {
    let fixture = CaptureFixture {
        camera_rate: Some(120.0),
        analog_rate: Some(1000.0),
        ..CaptureFixture::default()
    };
    let err = decode(&fixture).unwrap_err();
    assert!(matches!(err, CodecError::InvalidRateRatio { .. }));
    assert_eq!(err.kind(), ErrorKind::FormatError);
}

#[test]
fn test_header_samples_per_frame_must_match_rates() {
    let fixture = CaptureFixture {
        samples_per_frame: Some(5),
        ..CaptureFixture::default()
    };
    let err = decode(&fixture).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatError);

    let err = C3dDecoder::new(DecodeOptions::metadata_only())
        .decode_reader(Cursor::new(fixture.to_bytes()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatError);
    assert!(err.to_string().contains("analog samples per frame"));
}

#[test]
fn test_label_count_must_match_channels() {
    let mut fixture = CaptureFixture::default();
    let mut bytes = fixture.to_bytes();
    // Header claims 11 channels × 10 samples while 12 labels are declared.
    bytes[4..6].copy_from_slice(&110u16.to_le_bytes());
    let err = C3dDecoder::default()
        .decode_reader(Cursor::new(bytes))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatError);

    fixture.analog_labels.truncate(11);
    assert!(decode(&fixture).is_ok());
}

#[test]
fn test_truncated_frame_stream() {
    let fixture = CaptureFixture {
        written_frames: Some(30),
        trailing_bytes: 7,
        ..CaptureFixture::default()
    };
    let err = decode(&fixture).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralReadError);
    assert!(matches!(err, CodecError::StructuralRead { frame: 31, .. }));
}

#[test]
fn test_missing_file() {
    let err = decode_file("/definitely/not/a/capture.c3d").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ============================================================================
// Options and entry points
// ============================================================================

#[test]
fn test_metadata_only_skips_frames() {
    let dir = tempfile::tempdir().unwrap();
    // No frame records at all: only a metadata-only decode can succeed.
    let fixture = CaptureFixture {
        written_frames: Some(0),
        ..CaptureFixture::default()
    };
    let path = fixture.write(dir.path(), "header_only.c3d");

    let capture = read_metadata(&path).unwrap();
    assert!(capture.samples.is_none());
    assert_eq!(capture.metadata.frequency_ratio, 10);
    assert_eq!(capture.labels.analog.len(), 12);

    let err = decode_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralReadError);
}

#[test]
fn test_options_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("decode.toml");
    std::fs::write(&config, "read_samples = false\n").unwrap();
    let path = CaptureFixture::default().write(dir.path(), "trial.c3d");

    let options = DecodeOptions::load(&config).unwrap();
    let capture = C3dDecoder::new(options).decode(&path).unwrap();
    assert!(capture.samples.is_none());
}

#[test]
fn test_rate_tolerance_option() {
    let fixture = CaptureFixture {
        camera_rate: Some(100.0),
        analog_rate: Some(1000.5),
        samples_per_frame: Some(10),
        ..CaptureFixture::default()
    };
    assert!(decode(&fixture).is_err());

    let options = DecodeOptions::builder()
        .rate_ratio_tolerance(0.01)
        .build()
        .unwrap();
    let capture = C3dDecoder::new(options)
        .decode_reader(Cursor::new(fixture.to_bytes()))
        .unwrap();
    assert_eq!(capture.metadata.frequency_ratio, 10);
}

#[test]
fn test_file_and_reader_agree() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = CaptureFixture::default();
    let path = fixture.write(dir.path(), "trial.c3d");
    assert!(c3dcodec::is_c3d_file(&path));

    let from_file = decode_file(&path).unwrap();
    let from_reader = decode(&fixture).unwrap();
    assert_eq!(from_file, from_reader);
}

#[test]
fn test_batch_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let good = CaptureFixture::default().write(dir.path(), "good.c3d");
    let short = CaptureFixture {
        frames: 3,
        ..CaptureFixture::default()
    }
    .write(dir.path(), "short.c3d");
    let missing = dir.path().join("missing.c3d");

    let results = decode_all(&[good, missing, short], &DecodeOptions::default());
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().metadata.frame_count(), 50);
    assert_eq!(results[1].as_ref().unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(results[2].as_ref().unwrap().metadata.frame_count(), 3);
}
