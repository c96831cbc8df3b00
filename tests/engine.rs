//! Integration tests for the memoizing analysis engine.

use lapdelta::{AnalysisConfig, AnalysisEngine, AnalysisError, LapKey, LapRecord, Side, TelemetrySample};

fn constant_lap(speed: f64) -> Vec<TelemetrySample> {
    (0..=50)
        .map(|i| TelemetrySample::new(i as f64 * 20.0, i as f64 * 0.3).with_speed(speed))
        .collect()
}

fn race_laps(driver: &str, base: f64, slope: f64) -> Vec<LapRecord> {
    (1..=12)
        .map(|lap| LapRecord::new(driver, lap, base + slope * lap as f64).with_compound("MEDIUM"))
        .collect()
}

fn setup_engine() -> AnalysisEngine {
    let mut engine = AnalysisEngine::new();
    engine.add_trace(LapKey::new("VER", 5), constant_lap(250.0));
    engine.add_trace(LapKey::new("NOR", 5), constant_lap(245.0));
    engine.set_laps("VER", race_laps("VER", 90.0, 0.05));
    engine.set_laps("NOR", race_laps("NOR", 90.3, 0.08));
    engine
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_compare_is_cached() {
    let mut engine = setup_engine();
    let (ver, nor) = (LapKey::new("VER", 5), LapKey::new("NOR", 5));

    let side = engine.compare(&ver, &nor).unwrap().segments[0].side;
    assert_eq!(side, Side::First);
    engine.compare(&ver, &nor).unwrap();

    let stats = engine.stats();
    assert_eq!(stats.comparison_misses, 1);
    assert_eq!(stats.comparison_hits, 1);
    assert_eq!(stats.cached_comparisons, 1);
}

#[test]
fn test_replacing_trace_recomputes_comparison() {
    let mut engine = setup_engine();
    let (ver, nor) = (LapKey::new("VER", 5), LapKey::new("NOR", 5));

    assert_eq!(engine.compare(&ver, &nor).unwrap().segments[0].side, Side::First);

    engine.add_trace(nor.clone(), constant_lap(260.0));
    assert!(!engine.comparisons.contains(&ver, &nor));
    assert_eq!(engine.compare(&ver, &nor).unwrap().segments[0].side, Side::Second);
    assert_eq!(engine.stats().comparison_misses, 2);
}

#[test]
fn test_removed_trace_is_missing() {
    let mut engine = setup_engine();
    let (ver, nor) = (LapKey::new("VER", 5), LapKey::new("NOR", 5));
    engine.compare(&ver, &nor).unwrap();

    assert!(engine.remove_trace(&nor));
    assert!(!engine.remove_trace(&nor));
    assert!(!engine.has_trace(&nor));
    assert_eq!(engine.stats().cached_comparisons, 0);
    assert!(matches!(
        engine.compare(&ver, &nor),
        Err(AnalysisError::MissingTrace(_))
    ));
}

#[test]
fn test_config_change_drops_cache() {
    let mut engine = setup_engine();
    let (ver, nor) = (LapKey::new("VER", 5), LapKey::new("NOR", 5));
    engine.compare(&ver, &nor).unwrap();

    // A tie band wider than the 5 km/h gap
    engine
        .set_config(AnalysisConfig {
            tie_threshold: 10.0,
            ..AnalysisConfig::default()
        })
        .unwrap();
    assert_eq!(engine.stats().cached_comparisons, 0);
    assert_eq!(engine.compare(&ver, &nor).unwrap().segments[0].side, Side::Tie);
}

#[test]
fn test_invalid_config_rejected() {
    let mut engine = setup_engine();
    let bad = AnalysisConfig {
        grid_size: 0,
        ..AnalysisConfig::default()
    };

    assert!(engine.set_config(bad.clone()).is_err());
    assert_eq!(engine.config().grid_size, 500);
    assert!(AnalysisEngine::with_config(bad).is_err());
}

// ============================================================================
// Lap records
// ============================================================================

#[test]
fn test_pace_and_degradation() {
    let mut engine = setup_engine();

    assert_eq!(engine.pace("VER", true).unwrap().len(), 12);
    let model = engine.degradation("VER").unwrap();
    assert!((model.slope - 0.05).abs() < 1e-9);
    assert_eq!(engine.stats().cached_pace_series, 1);

    // Cached model is returned unchanged
    assert_eq!(engine.degradation("VER").unwrap(), model);
}

#[test]
fn test_set_laps_invalidates_driver() {
    let mut engine = setup_engine();
    engine.degradation("VER").unwrap();
    engine.degradation("NOR").unwrap();

    engine.set_laps("VER", race_laps("VER", 90.0, 0.2));
    assert!((engine.degradation("VER").unwrap().slope - 0.2).abs() < 1e-9);
    assert!((engine.degradation("NOR").unwrap().slope - 0.08).abs() < 1e-9);
}

#[test]
fn test_unknown_driver() {
    let mut engine = setup_engine();
    assert_eq!(
        engine.pace("ALB", true).unwrap_err(),
        AnalysisError::UnknownDriver("ALB".to_string())
    );
    assert!(engine.degradation("ALB").is_err());
    assert!(engine.stints("ALB").is_err());
}

#[test]
fn test_session_laps_grouped_by_driver() {
    let mut engine = AnalysisEngine::new();
    let mut laps = race_laps("PIA", 91.0, 0.1);
    laps.extend(race_laps("ALO", 91.5, 0.1));
    engine.set_session_laps(&laps);

    assert_eq!(engine.drivers(), vec!["ALO", "PIA"]);
    assert_eq!(engine.laps("PIA").unwrap().len(), 12);
    assert!(engine.laps("HUL").is_none());
}

#[test]
fn test_stints() {
    let mut engine = AnalysisEngine::new();
    let mut laps = race_laps("TSU", 92.0, 0.1);
    for lap in laps.iter_mut().skip(6) {
        lap.compound = Some("HARD".to_string());
    }
    engine.set_laps("TSU", laps);

    let stints = engine.stints("TSU").unwrap();
    assert_eq!(stints.len(), 2);
    assert_eq!(stints[1].start_lap, 7);
}

#[test]
fn test_clear() {
    let mut engine = setup_engine();
    engine.compare(&LapKey::new("VER", 5), &LapKey::new("NOR", 5)).unwrap();
    engine.pace("NOR", false).unwrap();

    engine.clear();
    let stats = engine.stats();
    assert_eq!(stats.trace_count, 0);
    assert_eq!(stats.driver_count, 0);
    assert_eq!(stats.cached_comparisons, 0);
    assert_eq!(stats.cached_pace_series, 0);
}
