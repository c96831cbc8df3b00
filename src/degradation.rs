//! Lap time degradation model.
//!
//! Fits an ordinary least squares line of lap time against lap number. The
//! slope is the degradation rate in seconds per lap.

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::pace::{PaceSample, clean_pace};
use crate::{AnalysisConfig, LapRecord};

/// Linear trend of lap time over lap number.
///
/// `Default` is the neutral model returned when there are too few laps.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DegradationModel {
    /// Seconds per lap
    pub slope: f64,
    /// Modelled lap time at lap zero, in seconds
    pub intercept: f64,
    /// Coefficient of determination (0-1 for a least squares fit)
    pub r_squared: f64,
}

impl DegradationModel {
    /// Modelled lap time for a lap number.
    pub fn predict(&self, lap_number: f64) -> f64 {
        self.intercept + self.slope * lap_number
    }

    /// True for the neutral model of a sparse series.
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

/// Fit lap time against lap number over every sample with a finite time.
///
/// Outliers are not excluded here; pass a pre-filtered series or use
/// [`fit_clean_degradation`]. Fewer than 2 usable samples give the neutral
/// model (all zeros).
///
/// # Example
/// ```
/// use lapdelta::{PaceSample, fit_degradation};
///
/// let pace = vec![PaceSample::new(1, 90.0), PaceSample::new(2, 91.0), PaceSample::new(3, 92.0)];
/// let model = fit_degradation(&pace);
/// assert!((model.slope - 1.0).abs() < 1e-12);
/// assert!((model.intercept - 89.0).abs() < 1e-12);
/// ```
pub fn fit_degradation(samples: &[PaceSample]) -> DegradationModel {
    let points: Vec<(f64, f64)> = samples
        .iter()
        .filter(|s| s.lap_time.is_finite())
        .map(|s| (s.lap_number as f64, s.lap_time))
        .collect();

    if points.len() < 2 {
        return DegradationModel::default();
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut ss_tot = 0.0;
    for &(x, y) in &points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        ss_tot += dy * dy;
    }

    // All laps share one lap number: no trend, flat line through the mean
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = mean_y - slope * mean_x;

    let ss_res: f64 = points
        .iter()
        .map(|&(x, y)| {
            let r = y - (intercept + slope * x);
            r * r
        })
        .sum();

    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    DegradationModel {
        slope,
        intercept,
        r_squared,
    }
}

/// Fit the degradation model after dropping laps flagged as outliers.
pub fn fit_clean_degradation(samples: &[PaceSample]) -> DegradationModel {
    let clean: Vec<PaceSample> = samples.iter().filter(|s| !s.is_outlier).cloned().collect();
    fit_degradation(&clean)
}

/// Degradation of one driver over a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverDegradation {
    pub driver: String,
    /// Laps in the cleaned pace series (outliers included)
    pub lap_count: usize,
    pub outlier_count: usize,
    pub model: DegradationModel,
}

/// Clean every driver's pace and fit a degradation model per driver.
///
/// Results are sorted by driver. With the `parallel` feature each driver is
/// processed on the rayon pool.
pub fn degradation_by_driver(laps: &[LapRecord], config: &AnalysisConfig) -> Vec<DriverDegradation> {
    let mut by_driver: BTreeMap<&str, Vec<&LapRecord>> = BTreeMap::new();
    for lap in laps {
        by_driver.entry(lap.driver.as_str()).or_default().push(lap);
    }
    let drivers: Vec<(&str, Vec<&LapRecord>)> = by_driver.into_iter().collect();

    let analyze = |(driver, driver_laps): &(&str, Vec<&LapRecord>)| {
        let pace = clean_pace(driver_laps, true, config);
        DriverDegradation {
            driver: driver.to_string(),
            lap_count: pace.len(),
            outlier_count: pace.iter().filter(|p| p.is_outlier).count(),
            model: fit_clean_degradation(&pace),
        }
    };

    #[cfg(feature = "parallel")]
    let results: Vec<DriverDegradation> = {
        use rayon::prelude::*;
        drivers.par_iter().map(analyze).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<DriverDegradation> = drivers.iter().map(analyze).collect();

    info!(
        "[Degradation] fitted {} drivers from {} laps",
        results.len(),
        laps.len()
    );

    results
}
