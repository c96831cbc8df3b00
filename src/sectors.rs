//! Sector time analysis.
//!
//! Mean sector times per driver over laps with all three sectors timed, and
//! the difference of each driver to a reference driver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::LapRecord;
use crate::error::{AnalysisError, Result};

/// Mean sector times of one driver, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSummary {
    pub driver: String,
    pub sector1: f64,
    pub sector2: f64,
    pub sector3: f64,
    /// Sum of the three means
    pub total: f64,
}

/// Sector times of one driver relative to the reference driver.
///
/// Positive values are slower than the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorDelta {
    pub driver: String,
    pub sector1: f64,
    pub sector2: f64,
    pub sector3: f64,
    pub total: f64,
}

/// Mean sector times per driver, fastest total first.
///
/// Drivers without a single fully timed lap are left out.
pub fn analyze_sectors(laps: &[LapRecord]) -> Vec<SectorSummary> {
    let mut sums: BTreeMap<&str, ([f64; 3], usize)> = BTreeMap::new();

    for lap in laps {
        let (Some(s1), Some(s2), Some(s3)) = (lap.sector1_time, lap.sector2_time, lap.sector3_time)
        else {
            continue;
        };
        let entry = sums.entry(lap.driver.as_str()).or_insert(([0.0; 3], 0));
        entry.0[0] += s1;
        entry.0[1] += s2;
        entry.0[2] += s3;
        entry.1 += 1;
    }

    let mut summaries: Vec<SectorSummary> = sums
        .into_iter()
        .map(|(driver, (totals, count))| {
            let n = count as f64;
            let (sector1, sector2, sector3) = (totals[0] / n, totals[1] / n, totals[2] / n);
            SectorSummary {
                driver: driver.to_string(),
                sector1,
                sector2,
                sector3,
                total: sector1 + sector2 + sector3,
            }
        })
        .collect();

    summaries.sort_by(|a, b| a.total.total_cmp(&b.total));
    summaries
}

/// Sector deltas of every driver to `reference`, smallest total delta first.
///
/// Returns `UnknownDriver` if the reference has no fully timed lap. With no
/// sector data at all, returns an empty list.
pub fn sector_deltas(laps: &[LapRecord], reference: &str) -> Result<Vec<SectorDelta>> {
    let summaries = analyze_sectors(laps);
    if summaries.is_empty() {
        return Ok(Vec::new());
    }

    let reference = summaries
        .iter()
        .find(|s| s.driver == reference)
        .ok_or_else(|| AnalysisError::UnknownDriver(reference.to_string()))?;

    let mut deltas: Vec<SectorDelta> = summaries
        .iter()
        .map(|s| SectorDelta {
            driver: s.driver.clone(),
            sector1: s.sector1 - reference.sector1,
            sector2: s.sector2 - reference.sector2,
            sector3: s.sector3 - reference.sector3,
            total: s.total - reference.total,
        })
        .collect();

    deltas.sort_by(|a, b| a.total.total_cmp(&b.total));
    Ok(deltas)
}
