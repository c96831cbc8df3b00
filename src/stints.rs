//! Tyre stint detection.
//!
//! A stint is a maximal run of consecutive laps on one compound. Runs are
//! purely sequential: returning to a compound used earlier starts a new stint.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::pace::{PaceSample, median};
use crate::segment::segment_runs;
use crate::{AnalysisConfig, LapRecord};

/// A lap-like entry that can be grouped into stints.
pub trait StintEntry {
    fn lap_number(&self) -> u32;
    fn compound(&self) -> Option<&str>;
}

impl StintEntry for LapRecord {
    fn lap_number(&self) -> u32 {
        self.lap_number
    }

    fn compound(&self) -> Option<&str> {
        self.compound.as_deref()
    }
}

impl StintEntry for PaceSample {
    fn lap_number(&self) -> u32 {
        self.lap_number
    }

    fn compound(&self) -> Option<&str> {
        self.compound.as_deref()
    }
}

impl<T: StintEntry> StintEntry for &T {
    fn lap_number(&self) -> u32 {
        (**self).lap_number()
    }

    fn compound(&self) -> Option<&str> {
        (**self).compound()
    }
}

/// A run of consecutive laps on one compound.
///
/// Laps without a compound never share a stint: each one forms its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stint {
    /// 1-based stint number in order of appearance
    pub stint_number: u32,
    pub compound: Option<String>,
    pub start_lap: u32,
    pub end_lap: u32,
    pub lap_count: usize,
    /// Index range `[start, end)` into the input entries
    pub start: usize,
    pub end: usize,
}

/// Group entries into stints by compound, in input order.
///
/// # Example
/// ```
/// use lapdelta::{PaceSample, extract_stints};
///
/// let pace = vec![
///     PaceSample::new(1, 92.0).with_compound("SOFT"),
///     PaceSample::new(2, 92.4).with_compound("SOFT"),
///     PaceSample::new(3, 91.0).with_compound("HARD"),
/// ];
/// let stints = extract_stints(&pace);
/// assert_eq!(stints.len(), 2);
/// assert_eq!(stints[1].compound.as_deref(), Some("HARD"));
/// ```
pub fn extract_stints<E: StintEntry>(entries: &[E]) -> Vec<Stint> {
    let labels: Vec<(Option<&str>, Option<usize>)> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| match e.compound() {
            Some(compound) => (Some(compound), None),
            // Unknown compounds are never equal to each other
            None => (None, Some(i)),
        })
        .collect();

    segment_runs(&labels)
        .into_iter()
        .enumerate()
        .map(|(i, run)| {
            let laps = &entries[run.range()];
            Stint {
                stint_number: i as u32 + 1,
                start_lap: laps.iter().map(|e| e.lap_number()).min().unwrap_or(0),
                end_lap: laps.iter().map(|e| e.lap_number()).max().unwrap_or(0),
                lap_count: run.len(),
                start: run.start,
                end: run.end,
                compound: run.label.0.map(str::to_string),
            }
        })
        .collect()
}

/// A stint of one driver in a session-wide stint table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStint {
    pub driver: String,
    #[serde(flatten)]
    pub stint: Stint,
}

/// Stints of every driver in a session, sorted by driver then stint number.
///
/// Index ranges in each `Stint` refer to that driver's laps in input order.
pub fn tyre_stints(laps: &[LapRecord]) -> Vec<DriverStint> {
    let mut by_driver: BTreeMap<&str, Vec<&LapRecord>> = BTreeMap::new();
    for lap in laps {
        by_driver.entry(lap.driver.as_str()).or_default().push(lap);
    }

    by_driver
        .into_iter()
        .flat_map(|(driver, driver_laps)| {
            extract_stints(&driver_laps)
                .into_iter()
                .map(move |stint| DriverStint {
                    driver: driver.to_string(),
                    stint,
                })
        })
        .collect()
}

/// Average race pace of one stint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StintAverage {
    pub stint_number: u32,
    pub compound: Option<String>,
    /// Mean lap time of the kept laps, in seconds
    pub avg_lap_time: f64,
    /// Laps kept after the per-stint outlier filter
    pub lap_count: usize,
}

/// Average lap time per stint for one driver's laps.
///
/// Only timed laps outside the pit lane are used. Within each stint, laps
/// slower than `median * config.outlier_ratio` are dropped before averaging;
/// an invalid `config` logs a warning and keeps every lap.
pub fn stint_averages<L>(laps: &[L], config: &AnalysisConfig) -> Vec<StintAverage>
where
    L: Borrow<LapRecord>,
{
    let ratio = match config.validate() {
        Ok(()) => config.outlier_ratio,
        Err(e) => {
            warn!("[Stints] {}; slow laps not filtered", e);
            f64::INFINITY
        }
    };

    let valid: Vec<&LapRecord> = laps
        .iter()
        .map(Borrow::<LapRecord>::borrow)
        .filter(|l| l.timed().is_some() && !l.is_pit_lap())
        .collect();

    extract_stints(&valid)
        .into_iter()
        .filter_map(|stint| {
            let times: Vec<f64> = valid[stint.start..stint.end]
                .iter()
                .filter_map(|l| l.timed())
                .collect();
            let threshold = median(&times)? * ratio;
            let kept: Vec<f64> = times.into_iter().filter(|&t| t <= threshold).collect();
            if kept.is_empty() {
                return None;
            }
            Some(StintAverage {
                stint_number: stint.stint_number,
                compound: stint.compound,
                avg_lap_time: kept.iter().sum::<f64>() / kept.len() as f64,
                lap_count: kept.len(),
            })
        })
        .collect()
}
