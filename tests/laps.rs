//! Tests for lap rankings, pit stops and sector analysis

use lapdelta::{
    AnalysisError, LapRecord, analyze_sectors, fastest_laps, pit_stops, sector_deltas, top_laps,
};

fn session() -> Vec<LapRecord> {
    vec![
        LapRecord::new("VER", 1, 92.1).with_team("Red Bull Racing"),
        LapRecord::new("VER", 2, 91.4).with_team("Red Bull Racing"),
        LapRecord::new("HAM", 1, 91.9).with_team("Mercedes"),
        LapRecord::new("HAM", 2, 91.2).with_team("Mercedes"),
        LapRecord::new("NOR", 1, 93.0).with_team("McLaren"),
        LapRecord {
            lap_time: None,
            ..LapRecord::new("NOR", 2, 0.0)
        },
    ]
}

// ============================================================================
// Rankings
// ============================================================================

#[test]
fn test_fastest_lap_per_driver() {
    let fastest = fastest_laps(&session());

    let summary: Vec<(&str, u32)> = fastest
        .iter()
        .map(|f| (f.driver.as_str(), f.lap_number))
        .collect();
    assert_eq!(summary, vec![("HAM", 2), ("VER", 2), ("NOR", 1)]);
    assert_eq!(fastest[0].team.as_deref(), Some("Mercedes"));
    assert_eq!(fastest[0].lap_time, 91.2);
}

#[test]
fn test_fastest_lap_tie_keeps_earlier_lap() {
    let laps = vec![
        LapRecord::new("ALO", 4, 90.5),
        LapRecord::new("ALO", 9, 90.5),
    ];
    let fastest = fastest_laps(&laps);
    assert_eq!(fastest.len(), 1);
    assert_eq!(fastest[0].lap_number, 4);
}

#[test]
fn test_driver_without_timed_lap_is_omitted() {
    let laps = vec![LapRecord {
        lap_time: None,
        ..LapRecord::new("STR", 1, 0.0)
    }];
    assert!(fastest_laps(&laps).is_empty());
}

#[test]
fn test_top_laps() {
    let top = top_laps(&session(), 3);
    let times: Vec<f64> = top.iter().map(|l| l.lap_time).collect();
    assert_eq!(times, vec![91.2, 91.4, 91.9]);

    assert_eq!(top_laps(&session(), 50).len(), 5);
    assert!(top_laps(&session(), 0).is_empty());
}

#[test]
fn test_pit_stops_sorted() {
    let mut laps = session();
    laps.push(LapRecord {
        pit_in_time: Some(2750.0),
        pit_out_time: Some(2772.5),
        compound: Some("HARD".to_string()),
        ..LapRecord::new("VER", 30, 110.0)
    });
    laps.push(LapRecord {
        pit_in_time: Some(1200.0),
        ..LapRecord::new("VER", 12, 109.0)
    });
    laps.push(LapRecord {
        pit_in_time: Some(1500.0),
        ..LapRecord::new("HAM", 15, 109.0)
    });
    // Pit-out only laps are not stops
    laps.push(LapRecord {
        pit_out_time: Some(1525.0),
        ..LapRecord::new("HAM", 16, 100.0)
    });

    let stops = pit_stops(&laps);
    let summary: Vec<(&str, u32)> = stops
        .iter()
        .map(|s| (s.driver.as_str(), s.lap_number))
        .collect();
    assert_eq!(summary, vec![("HAM", 15), ("VER", 12), ("VER", 30)]);
    assert_eq!(stops[2].pit_out_time, Some(2772.5));
    assert_eq!(stops[2].compound.as_deref(), Some("HARD"));
}

// ============================================================================
// Sectors
// ============================================================================

fn sector_session() -> Vec<LapRecord> {
    vec![
        LapRecord::new("VER", 1, 90.0).with_sectors(28.0, 34.0, 28.0),
        LapRecord::new("VER", 2, 91.0).with_sectors(29.0, 34.0, 28.0),
        LapRecord::new("LEC", 1, 90.2).with_sectors(28.2, 33.5, 28.5),
        // Incomplete sector data is ignored
        LapRecord::new("LEC", 2, 95.0),
        LapRecord::new("GAS", 1, 96.0),
    ]
}

#[test]
fn test_analyze_sectors_means() {
    let summaries = analyze_sectors(&sector_session());
    assert_eq!(summaries.len(), 2);

    assert_eq!(summaries[0].driver, "LEC");
    assert!((summaries[0].total - 90.2).abs() < 1e-9);

    assert_eq!(summaries[1].driver, "VER");
    assert!((summaries[1].sector1 - 28.5).abs() < 1e-9);
    assert!((summaries[1].total - 90.5).abs() < 1e-9);
}

#[test]
fn test_sector_deltas_to_reference() {
    let deltas = sector_deltas(&sector_session(), "VER").unwrap();
    assert_eq!(deltas.len(), 2);

    assert_eq!(deltas[0].driver, "LEC");
    assert!((deltas[0].sector1 + 0.3).abs() < 1e-9);
    assert!((deltas[0].sector2 + 0.5).abs() < 1e-9);
    assert!((deltas[0].total + 0.3).abs() < 1e-9);

    assert_eq!(deltas[1].driver, "VER");
    assert_eq!(deltas[1].total, 0.0);
}

#[test]
fn test_sector_deltas_unknown_reference() {
    assert_eq!(
        sector_deltas(&sector_session(), "GAS").unwrap_err(),
        AnalysisError::UnknownDriver("GAS".to_string())
    );
}

#[test]
fn test_sector_deltas_without_sector_data() {
    let laps = vec![LapRecord::new("VER", 1, 90.0)];
    assert!(sector_deltas(&laps, "VER").unwrap().is_empty());
}
