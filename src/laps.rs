//! Lap rankings and pit stops.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::LapRecord;

/// The fastest timed lap of one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastestLap {
    pub driver: String,
    pub team: Option<String>,
    pub lap_time: f64,
    pub lap_number: u32,
}

impl FastestLap {
    fn from_lap(lap: &LapRecord, lap_time: f64) -> Self {
        Self {
            driver: lap.driver.clone(),
            team: lap.team.clone(),
            lap_time,
            lap_number: lap.lap_number,
        }
    }
}

/// A lap on which the car entered the pit lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitStop {
    pub driver: String,
    pub lap_number: u32,
    pub pit_in_time: f64,
    pub pit_out_time: Option<f64>,
    pub compound: Option<String>,
}

/// Fastest timed lap per driver, fastest first.
///
/// On equal times the earlier lap is kept.
pub fn fastest_laps(laps: &[LapRecord]) -> Vec<FastestLap> {
    let mut best: BTreeMap<&str, FastestLap> = BTreeMap::new();

    for lap in laps {
        let Some(time) = lap.timed() else { continue };
        let faster = best
            .get(lap.driver.as_str())
            .is_none_or(|current| time < current.lap_time);
        if faster {
            best.insert(lap.driver.as_str(), FastestLap::from_lap(lap, time));
        }
    }

    let mut result: Vec<FastestLap> = best.into_values().collect();
    result.sort_by(|a, b| a.lap_time.total_cmp(&b.lap_time));
    result
}

/// The `n` fastest timed laps across all drivers, fastest first.
pub fn top_laps(laps: &[LapRecord], n: usize) -> Vec<FastestLap> {
    let mut timed: Vec<FastestLap> = laps
        .iter()
        .filter_map(|lap| lap.timed().map(|t| FastestLap::from_lap(lap, t)))
        .collect();
    timed.sort_by(|a, b| a.lap_time.total_cmp(&b.lap_time));
    timed.truncate(n);
    timed
}

/// Laps with a pit-in time, sorted by driver then lap number.
pub fn pit_stops(laps: &[LapRecord]) -> Vec<PitStop> {
    let mut stops: Vec<PitStop> = laps
        .iter()
        .filter_map(|lap| {
            Some(PitStop {
                driver: lap.driver.clone(),
                lap_number: lap.lap_number,
                pit_in_time: lap.pit_in_time?,
                pit_out_time: lap.pit_out_time,
                compound: lap.compound.clone(),
            })
        })
        .collect();
    stops.sort_by(|a, b| {
        a.driver
            .cmp(&b.driver)
            .then(a.lap_number.cmp(&b.lap_number))
    });
    stops
}
