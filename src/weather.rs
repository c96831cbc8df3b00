//! Weather summaries.
//!
//! Weather arrives twice: attached to each lap and as a separate session
//! series. Lap-attached values take precedence; the session series only fills
//! fields the laps do not provide.

use serde::{Deserialize, Serialize};

/// One weather reading. Fields the feed did not report are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Track temperature in °C
    #[serde(default)]
    pub track_temp: Option<f64>,
    /// Air temperature in °C
    #[serde(default)]
    pub air_temp: Option<f64>,
    /// Relative humidity in percent
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub rainfall: Option<bool>,
    /// Wind speed in m/s
    #[serde(default)]
    pub wind_speed: Option<f64>,
    /// Air pressure in mbar
    #[serde(default)]
    pub pressure: Option<f64>,
}

/// Session weather conditions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub track_temp: Option<f64>,
    pub air_temp: Option<f64>,
    pub humidity: Option<f64>,
    pub rainfall: bool,
    pub wind_speed: Option<f64>,
    pub pressure: Option<f64>,
    /// (min, max) when track temperature varied by more than 2 °C
    pub track_temp_range: Option<(f64, f64)>,
    /// (min, max) when air temperature varied by more than 2 °C
    pub air_temp_range: Option<(f64, f64)>,
}

/// Spread above which a temperature range is reported.
const SIGNIFICANT_TEMP_SPREAD: f64 = 2.0;

/// Summarise lap-attached weather, falling back to the session series.
pub fn summarize_weather(
    lap_weather: &[WeatherSample],
    session_weather: &[WeatherSample],
) -> WeatherSummary {
    let track = Stats::of(lap_weather.iter().filter_map(|w| w.track_temp));
    let air = Stats::of(lap_weather.iter().filter_map(|w| w.air_temp));

    let mut summary = WeatherSummary {
        track_temp: track.map(|s| s.mean),
        air_temp: air.map(|s| s.mean),
        humidity: mean_of(lap_weather.iter().filter_map(|w| w.humidity)),
        rainfall: lap_weather.iter().any(|w| w.rainfall == Some(true)),
        wind_speed: mean_of(lap_weather.iter().filter_map(|w| w.wind_speed)),
        pressure: mean_of(lap_weather.iter().filter_map(|w| w.pressure)),
        track_temp_range: track.and_then(Stats::significant_range),
        air_temp_range: air.and_then(Stats::significant_range),
    };

    if summary.track_temp.is_none() {
        summary.track_temp = mean_of(session_weather.iter().filter_map(|w| w.track_temp));
    }
    if summary.air_temp.is_none() {
        summary.air_temp = mean_of(session_weather.iter().filter_map(|w| w.air_temp));
    }
    if summary.humidity.is_none() {
        summary.humidity = mean_of(session_weather.iter().filter_map(|w| w.humidity));
    }
    if !summary.rainfall {
        summary.rainfall = session_weather.iter().any(|w| w.rainfall == Some(true));
    }
    if summary.wind_speed.is_none() {
        summary.wind_speed = mean_of(session_weather.iter().filter_map(|w| w.wind_speed));
    }
    if summary.pressure.is_none() {
        summary.pressure = mean_of(session_weather.iter().filter_map(|w| w.pressure));
    }

    summary
}

#[derive(Debug, Clone, Copy)]
struct Stats {
    mean: f64,
    min: f64,
    max: f64,
}

impl Stats {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.filter(|v| v.is_finite()) {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        (count > 0).then(|| Self {
            mean: sum / count as f64,
            min,
            max,
        })
    }

    fn significant_range(self) -> Option<(f64, f64)> {
        (self.max - self.min > SIGNIFICANT_TEMP_SPREAD).then_some((self.min, self.max))
    }
}

fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    Stats::of(values).map(|s| s.mean)
}
