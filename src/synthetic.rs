//! Synthetic lap data generator for stress testing and benchmarking.
//!
//! Generates telemetry traces over a circuit with known corners and DRS
//! zones, and race lap records with known degradation, stints and outlier
//! laps, providing ground truth for the analysis functions.
//!
//! Feature-gated behind `synthetic`; not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use lapdelta::synthetic::{SyntheticCircuit, SyntheticRace};
//!
//! let circuit = SyntheticCircuit::standard();
//! let lap = circuit.generate_lap(1.0, 42);
//! assert!(lap.len() > 500);
//!
//! let race = SyntheticRace::standard();
//! let laps = race.generate();
//! assert_eq!(laps.len(), race.drivers.len() * race.lap_count as usize);
//! ```

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{LapRecord, TelemetrySample};

// ============================================================================
// Types
// ============================================================================

/// A corner of the synthetic circuit.
#[derive(Debug, Clone, Copy)]
pub struct CornerConfig {
    /// Distance of the apex from the start line in metres.
    pub apex_position: f64,
    /// Minimum speed at the apex in km/h.
    pub apex_speed: f64,
    /// Length of the braking + traction zone around the apex in metres.
    pub length: f64,
}

/// A circuit with a deterministic ideal speed profile.
#[derive(Debug, Clone)]
pub struct SyntheticCircuit {
    /// Lap length in metres.
    pub length: f64,
    /// Top speed on the straights in km/h.
    pub top_speed: f64,
    pub corners: Vec<CornerConfig>,
    /// DRS zones as (start, end) distances in metres.
    pub drs_zones: Vec<(f64, f64)>,
    /// Mean distance between telemetry samples in metres.
    pub sample_spacing: f64,
    /// Speed noise standard deviation in km/h.
    pub speed_noise_sigma: f64,
}

/// One driver of a synthetic race.
#[derive(Debug, Clone)]
pub struct DriverProfile {
    pub code: String,
    pub team: String,
    /// Lap time offset from the base lap time in seconds.
    pub pace_offset: f64,
    /// Lap time lost per lap of tyre age in seconds.
    pub degradation_per_lap: f64,
}

/// Scenario configuration for generating race lap records.
#[derive(Debug, Clone)]
pub struct SyntheticRace {
    pub drivers: Vec<DriverProfile>,
    pub lap_count: u32,
    /// Fresh-tyre lap time in seconds.
    pub base_lap_time: f64,
    /// Lap on which every driver enters the pit lane.
    pub pit_lap: Option<u32>,
    pub start_compound: String,
    pub second_compound: String,
    /// Laps run under a yellow flag (status "2") and 15 s slower.
    pub yellow_flag_laps: Vec<u32>,
    /// Laps run at green status but 12 s slower (traffic).
    pub traffic_laps: Vec<u32>,
    /// Lap time noise standard deviation in seconds.
    pub lap_time_noise_sigma: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

// ============================================================================
// Noise Helpers
// ============================================================================

/// Standard normal sample (Box-Muller).
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

// ============================================================================
// Circuit Generation
// ============================================================================

impl SyntheticCircuit {
    /// A 5 km circuit with six corners and two DRS zones.
    pub fn standard() -> Self {
        Self {
            length: 5000.0,
            top_speed: 320.0,
            corners: vec![
                CornerConfig { apex_position: 600.0, apex_speed: 95.0, length: 400.0 },
                CornerConfig { apex_position: 1300.0, apex_speed: 180.0, length: 300.0 },
                CornerConfig { apex_position: 1900.0, apex_speed: 140.0, length: 350.0 },
                CornerConfig { apex_position: 2900.0, apex_speed: 75.0, length: 450.0 },
                CornerConfig { apex_position: 3600.0, apex_speed: 215.0, length: 250.0 },
                CornerConfig { apex_position: 4500.0, apex_speed: 120.0, length: 400.0 },
            ],
            drs_zones: vec![(2050.0, 2650.0), (4750.0, 5000.0)],
            sample_spacing: 8.0,
            speed_noise_sigma: 0.0,
        }
    }

    /// Ideal speed in km/h at a distance, before pace scaling.
    pub fn speed_at(&self, position: f64) -> f64 {
        self.corners.iter().fold(self.top_speed, |speed, corner| {
            let half = corner.length / 2.0;
            let d = (position - corner.apex_position).abs();
            if d >= half {
                speed
            } else {
                let ratio = d / half;
                let corner_speed =
                    corner.apex_speed + (self.top_speed - corner.apex_speed) * ratio * ratio;
                speed.min(corner_speed)
            }
        })
    }

    fn in_drs_zone(&self, position: f64) -> bool {
        self.drs_zones
            .iter()
            .any(|&(start, end)| position >= start && position <= end)
    }

    /// Generate one lap of telemetry.
    ///
    /// `pace_factor` scales every speed (1.0 = ideal). Sample spacing is
    /// jittered so two laps never share sample positions.
    pub fn generate_lap(&self, pace_factor: f64, seed: u64) -> Vec<TelemetrySample> {
        let mut rng = StdRng::seed_from_u64(seed);
        let radius = self.length / (2.0 * PI);

        let mut samples = Vec::with_capacity((self.length / self.sample_spacing) as usize + 2);
        let mut position = 0.0;
        let mut time = 0.0;
        let mut prev_speed = self.speed_at(0.0) * pace_factor;

        while position <= self.length {
            let ideal = self.speed_at(position) * pace_factor;
            let speed = if self.speed_noise_sigma > 0.0 {
                (ideal + gaussian(&mut rng) * self.speed_noise_sigma).max(1.0)
            } else {
                ideal
            };

            let braking = ideal < prev_speed - 0.01;
            let throttle = if braking { 0.0 } else { (ideal / self.top_speed * 100.0).min(100.0) };
            let brake = if braking { 100.0 } else { 0.0 };
            let gear = (1.0 + ideal / 45.0).floor().clamp(1.0, 8.0);
            let drs = if self.in_drs_zone(position) { 12.0 } else { 0.0 };
            let angle = 2.0 * PI * position / self.length;

            samples.push(
                TelemetrySample::new(position, time)
                    .with_speed(speed)
                    .with_throttle(throttle)
                    .with_brake(brake)
                    .with_gear(gear)
                    .with_drs(drs)
                    .with_xy(radius * angle.cos(), radius * angle.sin()),
            );

            let step = self.sample_spacing * rng.gen_range(0.6..1.4);
            time += step / (speed / 3.6);
            position += step;
            prev_speed = ideal;
        }

        samples
    }
}

// ============================================================================
// Race Generation
// ============================================================================

impl SyntheticRace {
    /// Three drivers, 30 laps, one pit stop on lap 15, a yellow flag on lap 8
    /// and a traffic lap on lap 22.
    pub fn standard() -> Self {
        Self {
            drivers: vec![
                DriverProfile {
                    code: "VER".to_string(),
                    team: "Red Bull Racing".to_string(),
                    pace_offset: 0.0,
                    degradation_per_lap: 0.05,
                },
                DriverProfile {
                    code: "HAM".to_string(),
                    team: "Mercedes".to_string(),
                    pace_offset: 0.3,
                    degradation_per_lap: 0.08,
                },
                DriverProfile {
                    code: "LEC".to_string(),
                    team: "Ferrari".to_string(),
                    pace_offset: 0.2,
                    degradation_per_lap: 0.12,
                },
            ],
            lap_count: 30,
            base_lap_time: 92.0,
            pit_lap: Some(15),
            start_compound: "MEDIUM".to_string(),
            second_compound: "HARD".to_string(),
            yellow_flag_laps: vec![8],
            traffic_laps: vec![22],
            lap_time_noise_sigma: 0.0,
            seed: 7,
        }
    }

    /// Generate lap records for every driver, driver by driver.
    pub fn generate(&self) -> Vec<LapRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut laps = Vec::with_capacity(self.drivers.len() * self.lap_count as usize);

        for driver in &self.drivers {
            let mut tyre_age = 0u32;

            for lap_number in 1..=self.lap_count {
                let pitted_before = self.pit_lap.is_some_and(|p| lap_number > p);
                let compound = if pitted_before {
                    &self.second_compound
                } else {
                    &self.start_compound
                };

                let mut lap_time = self.base_lap_time
                    + driver.pace_offset
                    + driver.degradation_per_lap * tyre_age as f64;
                if self.lap_time_noise_sigma > 0.0 {
                    lap_time += gaussian(&mut rng) * self.lap_time_noise_sigma;
                }

                let mut lap = LapRecord::new(&driver.code, lap_number, lap_time)
                    .with_team(&driver.team)
                    .with_compound(compound)
                    .with_track_status("1");

                if self.yellow_flag_laps.contains(&lap_number) {
                    lap.lap_time = Some(lap_time + 15.0);
                    lap.track_status = Some("2".to_string());
                }
                if self.traffic_laps.contains(&lap_number) {
                    lap.lap_time = Some(lap_time + 12.0);
                }
                if self.pit_lap == Some(lap_number) {
                    lap.lap_time = Some(lap_time + 20.0);
                    lap.pit_in_time = Some(lap_number as f64 * self.base_lap_time);
                }
                if self.pit_lap.is_some_and(|p| lap_number == p + 1) {
                    lap.lap_time = Some(lap_time + 2.0);
                    lap.pit_out_time = Some((lap_number - 1) as f64 * self.base_lap_time + 22.0);
                    tyre_age = 0;
                }

                let time = lap.lap_time.unwrap_or(lap_time);
                laps.push(lap.with_sectors(time * 0.3, time * 0.38, time * 0.32));
                tyre_age += 1;
            }
        }

        laps
    }
}
