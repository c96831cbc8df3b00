//! Tests for lib.rs core types and configuration

use lapdelta::{AnalysisConfig, AnalysisError, Channel, LapRecord, Side, TelemetrySample};

#[test]
fn test_sample_validation() {
    assert!(TelemetrySample::new(0.0, 0.0).is_valid());
    assert!(TelemetrySample::new(5012.3, 88.1).is_valid());
    assert!(!TelemetrySample::new(f64::NAN, 1.0).is_valid());
    assert!(!TelemetrySample::new(f64::INFINITY, 1.0).is_valid());
}

#[test]
fn test_channel_values() {
    let sample = TelemetrySample::new(10.0, 0.5)
        .with_speed(200.0)
        .with_drs(12.0)
        .with_xy(1.0, -2.0);

    assert_eq!(Channel::Time.value(&sample), Some(0.5));
    assert_eq!(Channel::Speed.value(&sample), Some(200.0));
    assert_eq!(Channel::Drs.value(&sample), Some(12.0));
    assert_eq!(Channel::Y.value(&sample), Some(-2.0));
    assert_eq!(Channel::Rpm.value(&sample), None);
    assert_eq!(Channel::ALL.len(), 9);
}

#[test]
fn test_channel_names() {
    assert_eq!(Channel::Throttle.to_string(), "throttle");
    assert_eq!(format!("{:>6}", Channel::X), "     x");
    assert_eq!(serde_json::to_string(&Channel::Drs).unwrap(), "\"drs\"");
}

#[test]
fn test_sample_json_skips_missing_channels() {
    let json = serde_json::to_string(&TelemetrySample::new(1.0, 2.0).with_speed(3.0)).unwrap();
    assert_eq!(json, r#"{"position":1.0,"time":2.0,"speed":3.0}"#);

    let parsed: TelemetrySample =
        serde_json::from_str(r#"{"position":5.0,"time":0.1,"gear":6.0}"#).unwrap();
    assert_eq!(parsed.gear, Some(6.0));
    assert_eq!(parsed.speed, None);
}

#[test]
fn test_lap_record_from_sparse_json() {
    let lap: LapRecord = serde_json::from_str(r#"{"driver":"VER","lap_number":3}"#).unwrap();
    assert_eq!(lap.driver, "VER");
    assert_eq!(lap.lap_time, None);
    assert!(lap.is_green());
    assert!(!lap.is_representative());
}

#[test]
fn test_lap_record_classification() {
    let lap = LapRecord::new("HAM", 4, 91.3).with_track_status("1");
    assert!(lap.is_representative());
    assert_eq!(lap.timed(), Some(91.3));

    let yellow = LapRecord::new("HAM", 5, 99.0).with_track_status("2");
    assert!(!yellow.is_green());
    assert!(!yellow.is_representative());

    let pit = LapRecord {
        pit_out_time: Some(3000.0),
        ..LapRecord::new("HAM", 6, 95.0)
    };
    assert!(pit.is_pit_lap());
    assert!(!pit.is_representative());

    assert_eq!(LapRecord::new("HAM", 7, 0.0).timed(), None);
    assert_eq!(LapRecord::new("HAM", 8, f64::NAN).timed(), None);
}

#[test]
fn test_side_from_delta() {
    assert_eq!(Side::from_delta(0.6, 0.5), Side::First);
    assert_eq!(Side::from_delta(-0.6, 0.5), Side::Second);
    assert_eq!(Side::from_delta(0.5, 0.5), Side::Tie);
    assert_eq!(Side::from_delta(-0.5, 0.5), Side::Tie);
    assert_eq!(Side::from_delta(0.0, 0.0), Side::Tie);
    assert_eq!(Side::Second.to_string(), "second");
}

#[test]
fn test_default_config() {
    let config = AnalysisConfig::default();
    assert_eq!(config.grid_size, 500);
    assert_eq!(config.tie_threshold, 0.5);
    assert_eq!(config.outlier_ratio, 1.07);
    assert_eq!(config.corner_speed_threshold, 200.0);
    assert_eq!(config.straight_speed_threshold, 250.0);
    assert_eq!(config.min_zone_length, 100.0);
    assert!(!config.detail_channels.contains(&Channel::Speed));
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation() {
    let cases = [
        AnalysisConfig {
            grid_size: 0,
            ..AnalysisConfig::default()
        },
        AnalysisConfig {
            tie_threshold: -1.0,
            ..AnalysisConfig::default()
        },
        AnalysisConfig {
            outlier_ratio: 0.0,
            ..AnalysisConfig::default()
        },
        AnalysisConfig {
            min_zone_length: f64::NAN,
            ..AnalysisConfig::default()
        },
    ];

    for config in cases {
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));
    }
}

#[test]
fn test_config_json_roundtrip() {
    let config = AnalysisConfig {
        grid_size: 250,
        detail_channels: vec![Channel::Brake],
        ..AnalysisConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: AnalysisConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}
