//! # Lap Delta
//!
//! Lap telemetry comparison library for motorsport timing data.
//!
//! This library provides:
//! - Distance-aligned resampling of two lap traces onto a shared grid
//! - Run-length segmentation of any label sequence
//! - "Who is faster where" performance splits between two laps
//! - Lap pace cleaning (pit/flag exclusion, 107% outlier flagging)
//! - Tyre degradation trend fitting (least squares)
//! - Stint, corner, straight and DRS-zone extraction
//! - Caller-owned memoization engine for interactive front ends
//!
//! ## Features
//!
//! - **`parallel`** - Enable per-driver batch processing with rayon
//! - **`synthetic`** - Deterministic synthetic lap generator for tests and benches
//! - **`cli`** - Build the `lapdelta-cli` debug tool
//!
//! ## Quick Start
//!
//! ```rust
//! use lapdelta::{AnalysisConfig, Side, TelemetrySample, compare_laps};
//!
//! let lap1: Vec<TelemetrySample> = (0..=100)
//!     .map(|i| TelemetrySample::new(i as f64 * 10.0, i as f64 * 0.1).with_speed(250.0))
//!     .collect();
//! let lap2: Vec<TelemetrySample> = (0..=100)
//!     .map(|i| TelemetrySample::new(i as f64 * 10.0, i as f64 * 0.1).with_speed(240.0))
//!     .collect();
//!
//! let comparison = compare_laps(&lap1, &lap2, &AnalysisConfig::default()).unwrap();
//! assert_eq!(comparison.segments.len(), 1);
//! assert_eq!(comparison.segments[0].side, Side::First);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{AnalysisError, OptionExt, Result};

// Shared-grid resampling of two traces
pub mod resample;
pub use resample::{ResampledPair, ResampledTrace, interpolate, resample, resample_with_config};

// Generic run-length segmentation
pub mod segment;
pub use segment::{Segment, segment_by, segment_runs};

// Faster-side performance splits
pub mod split;
pub use split::{
    ComparisonSample, ComparisonSegment, LapComparison, SplitPoint, SplitSegment,
    build_performance_split, compare_laps,
};

// Lap pace cleaning
pub mod pace;
pub use pace::{PaceSample, clean_pace, laps_for_driver, median};

// Degradation trend model
pub mod degradation;
pub use degradation::{
    DegradationModel, DriverDegradation, degradation_by_driver, fit_clean_degradation,
    fit_degradation,
};

// Stint detection and stint averages
pub mod stints;
pub use stints::{
    DriverStint, Stint, StintAverage, StintEntry, extract_stints, stint_averages, tyre_stints,
};

// Corner, straight and activation-zone extraction
pub mod zones;
pub use zones::{
    SpeedExtreme, Zone, extract_activation_zones, extract_corners, extract_straights,
    extract_zones,
};

// Lap rankings and pit stops
pub mod laps;
pub use laps::{FastestLap, PitStop, fastest_laps, pit_stops, top_laps};

// Sector time analysis
pub mod sectors;
pub use sectors::{SectorDelta, SectorSummary, analyze_sectors, sector_deltas};

// Per-lap telemetry summaries
pub mod telemetry;
pub use telemetry::gear_usage;

// Weather summaries
pub mod weather;
pub use weather::{WeatherSample, WeatherSummary, summarize_weather};

// Caller-owned memoization engine
pub mod engine;
pub use engine::{AnalysisEngine, ComparisonCache, LapKey, TraceStore};

// Synthetic lap generator for stress testing and benchmarking
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A named scalar channel of a telemetry sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Time,
    Speed,
    Throttle,
    Brake,
    Gear,
    Rpm,
    Drs,
    X,
    Y,
}

impl Channel {
    /// Every channel, in declaration order.
    pub const ALL: [Channel; 9] = [
        Channel::Time,
        Channel::Speed,
        Channel::Throttle,
        Channel::Brake,
        Channel::Gear,
        Channel::Rpm,
        Channel::Drs,
        Channel::X,
        Channel::Y,
    ];

    /// Read this channel from a sample. `None` if the sample did not record it.
    pub fn value(&self, sample: &TelemetrySample) -> Option<f64> {
        match self {
            Channel::Time => Some(sample.time),
            Channel::Speed => sample.speed,
            Channel::Throttle => sample.throttle,
            Channel::Brake => sample.brake,
            Channel::Gear => sample.gear,
            Channel::Rpm => sample.rpm,
            Channel::Drs => sample.drs,
            Channel::X => sample.x,
            Channel::Y => sample.y,
        }
    }

    /// Returns the channel name as used in serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Time => "time",
            Channel::Speed => "speed",
            Channel::Throttle => "throttle",
            Channel::Brake => "brake",
            Channel::Gear => "gear",
            Channel::Rpm => "rpm",
            Channel::Drs => "drs",
            Channel::X => "x",
            Channel::Y => "y",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One telemetry sample along a lap.
///
/// `position` is the distance from the start line in metres and is the
/// alignment axis for every comparison. Channels are optional because the
/// upstream feed does not record every channel on every sample.
///
/// # Example
/// ```
/// use lapdelta::TelemetrySample;
/// let sample = TelemetrySample::new(120.0, 1.8).with_speed(212.0).with_gear(5.0);
/// assert_eq!(sample.speed, Some(212.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Distance along the lap in metres
    pub position: f64,
    /// Seconds since the start of the lap
    pub time: f64,
    /// Speed in km/h
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Throttle position in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle: Option<f64>,
    /// Brake pressure (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brake: Option<f64>,
    /// Selected gear
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<f64>,
    /// DRS state: 0 closed, anything above zero counts as active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drs: Option<f64>,
    /// Planar track coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl TelemetrySample {
    /// Create a sample with only position and time recorded.
    pub fn new(position: f64, time: f64) -> Self {
        Self {
            position,
            time,
            ..Default::default()
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_throttle(mut self, throttle: f64) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn with_brake(mut self, brake: f64) -> Self {
        self.brake = Some(brake);
        self
    }

    pub fn with_gear(mut self, gear: f64) -> Self {
        self.gear = Some(gear);
        self
    }

    pub fn with_drs(mut self, drs: f64) -> Self {
        self.drs = Some(drs);
        self
    }

    pub fn with_xy(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Check if the sample can be placed on the distance axis.
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
    }
}

/// One timed lap of one driver, as delivered by the timing feed.
///
/// Times are in seconds. Missing values mean the feed had no value for the
/// lap (e.g. no lap time on a lap that ended in the pit lane).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LapRecord {
    /// Driver abbreviation (e.g. "VER")
    pub driver: String,
    #[serde(default)]
    pub team: Option<String>,
    pub lap_number: u32,
    #[serde(default)]
    pub lap_time: Option<f64>,
    /// Tyre compound (e.g. "SOFT", "MEDIUM")
    #[serde(default)]
    pub compound: Option<String>,
    /// Session time the car entered the pit lane on this lap
    #[serde(default)]
    pub pit_in_time: Option<f64>,
    /// Session time the car left the pit lane on this lap
    #[serde(default)]
    pub pit_out_time: Option<f64>,
    /// Track status code; "1" is green flag
    #[serde(default)]
    pub track_status: Option<String>,
    #[serde(default)]
    pub sector1_time: Option<f64>,
    #[serde(default)]
    pub sector2_time: Option<f64>,
    #[serde(default)]
    pub sector3_time: Option<f64>,
}

impl LapRecord {
    /// Create a lap with a driver, lap number and lap time.
    pub fn new(driver: &str, lap_number: u32, lap_time: f64) -> Self {
        Self {
            driver: driver.to_string(),
            lap_number,
            lap_time: Some(lap_time),
            ..Default::default()
        }
    }

    pub fn with_compound(mut self, compound: &str) -> Self {
        self.compound = Some(compound.to_string());
        self
    }

    pub fn with_team(mut self, team: &str) -> Self {
        self.team = Some(team.to_string());
        self
    }

    pub fn with_track_status(mut self, status: &str) -> Self {
        self.track_status = Some(status.to_string());
        self
    }

    pub fn with_sectors(mut self, s1: f64, s2: f64, s3: f64) -> Self {
        self.sector1_time = Some(s1);
        self.sector2_time = Some(s2);
        self.sector3_time = Some(s3);
        self
    }

    /// Lap time if it is a usable duration.
    pub fn timed(&self) -> Option<f64> {
        self.lap_time.filter(|t| t.is_finite() && *t > 0.0)
    }

    /// Pit-in or pit-out lap.
    pub fn is_pit_lap(&self) -> bool {
        self.pit_in_time.is_some() || self.pit_out_time.is_some()
    }

    /// Green-flag lap. Laps without a recorded status count as green.
    pub fn is_green(&self) -> bool {
        self.track_status.as_deref().is_none_or(|s| s == "1")
    }

    /// Timed, green-flag lap that did not start or end in the pit lane.
    pub fn is_representative(&self) -> bool {
        self.timed().is_some() && !self.is_pit_lap() && self.is_green()
    }
}

/// Side of a two-lap comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The first lap is faster here
    First,
    /// The second lap is faster here
    Second,
    /// Neither lap is ahead by more than the tie threshold
    Tie,
}

impl Side {
    /// Classify a signed difference (first minus second) against a tie band.
    pub fn from_delta(delta: f64, threshold: f64) -> Self {
        if delta > threshold {
            Side::First
        } else if delta < -threshold {
            Side::Second
        } else {
            Side::Tie
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::First => "first",
            Side::Second => "second",
            Side::Tie => "tie",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Configuration for lap analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of points on the shared distance grid.
    /// Capped by the integer span of the overlap in metres.
    /// Default: 500
    pub grid_size: usize,

    /// Speed difference (km/h) below which neither lap is considered faster.
    /// Default: 0.5
    pub tie_threshold: f64,

    /// Laps slower than `median * outlier_ratio` are flagged as outliers.
    /// Default: 1.07 (the 107% rule)
    pub outlier_ratio: f64,

    /// Samples below this speed (km/h) belong to a corner.
    /// Default: 200.0
    pub corner_speed_threshold: f64,

    /// Samples above this speed (km/h) belong to a straight.
    /// Default: 250.0
    pub straight_speed_threshold: f64,

    /// Activation zones shorter than this (metres) are dropped as noise.
    /// Default: 100.0
    pub min_zone_length: f64,

    /// Channels carried as per-sample detail in a lap comparison.
    /// Default: throttle, brake, gear, DRS, X, Y
    pub detail_channels: Vec<Channel>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            grid_size: 500,
            tie_threshold: 0.5,
            outlier_ratio: 1.07,
            corner_speed_threshold: 200.0,
            straight_speed_threshold: 250.0,
            min_zone_length: 100.0,
            detail_channels: vec![
                Channel::Throttle,
                Channel::Brake,
                Channel::Gear,
                Channel::Drs,
                Channel::X,
                Channel::Y,
            ],
        }
    }
}

impl AnalysisConfig {
    /// Reject values no analysis can run with.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(AnalysisError::InvalidConfig(
                "grid_size must be at least 1".to_string(),
            ));
        }
        if !self.tie_threshold.is_finite() || self.tie_threshold < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "tie_threshold must be a non-negative number, got {}",
                self.tie_threshold
            )));
        }
        if !self.outlier_ratio.is_finite() || self.outlier_ratio <= 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "outlier_ratio must be positive, got {}",
                self.outlier_ratio
            )));
        }
        if !self.min_zone_length.is_finite() || self.min_zone_length < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_zone_length must be a non-negative number, got {}",
                self.min_zone_length
            )));
        }
        Ok(())
    }
}
