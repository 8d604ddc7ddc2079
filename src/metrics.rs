//! Speed and accuracy arithmetic.
//!
//! Every function here is total: degenerate inputs (no elapsed time, nothing typed,
//! too few samples) yield the documented fallback instead of `NaN`.

use crate::session::{CharacterStats, Mode, TestConfig};
use crate::time_series::{SpeedSample, SpeedSeries};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CHARS_PER_WORD: f64 = 5.0;
pub const MAX_WPM: u32 = 250;

/// Metrics refreshed after every accepted character while a test is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub net_wpm: u32,
    pub raw_wpm: u32,
    pub accuracy: u32,
    pub cpm: u32,
}

impl Default for LiveMetrics {
    fn default() -> Self {
        Self {
            net_wpm: 0,
            raw_wpm: 0,
            accuracy: 100,
            cpm: 0,
        }
    }
}

/// Metrics sealed once when a test completes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalMetrics {
    pub live: LiveMetrics,
    pub consistency: f64,
    pub duration_secs: u64,
}

fn elapsed_minutes(elapsed: Duration) -> f64 {
    elapsed.as_millis() as f64 / 60_000.0
}

/// Words per minute for `chars` characters, clamped to `[0, MAX_WPM]`
pub fn wpm(chars: usize, elapsed: Duration) -> u32 {
    let minutes = elapsed_minutes(elapsed);
    if minutes <= 0.0 {
        return 0;
    }
    let value = (chars as f64 / CHARS_PER_WORD / minutes).round();
    value.clamp(0.0, MAX_WPM as f64) as u32
}

pub fn net_wpm(stats: &CharacterStats, elapsed: Duration) -> u32 {
    wpm(stats.correct, elapsed)
}

pub fn raw_wpm(stats: &CharacterStats, elapsed: Duration) -> u32 {
    wpm(stats.classified(), elapsed)
}

pub fn accuracy(stats: &CharacterStats) -> u32 {
    let total = stats.classified();
    if total == 0 {
        return 100;
    }
    ((stats.correct as f64 / total as f64) * 100.0).round() as u32
}

pub fn cpm(stats: &CharacterStats, elapsed: Duration) -> u32 {
    let minutes = elapsed_minutes(elapsed);
    if minutes <= 0.0 {
        return 0;
    }
    (stats.classified() as f64 / minutes).round() as u32
}

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let variance = data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / data.len() as f64;
    Some(variance.sqrt())
}

/// 0-100 score penalising spread in the net WPM series: `100 - 2 * cv`
pub fn consistency(net_wpm_series: &[f64]) -> f64 {
    if net_wpm_series.len() < 2 {
        return 100.0;
    }
    match (mean(net_wpm_series), std_dev(net_wpm_series)) {
        (Some(m), Some(sd)) if m > 0.0 => {
            let cv = sd / m * 100.0;
            (100.0 - 2.0 * cv).clamp(0.0, 100.0)
        }
        _ => 100.0,
    }
}

pub fn compute(stats: &CharacterStats, elapsed: Duration) -> LiveMetrics {
    LiveMetrics {
        net_wpm: net_wpm(stats, elapsed),
        raw_wpm: raw_wpm(stats, elapsed),
        accuracy: accuracy(stats),
        cpm: cpm(stats, elapsed),
    }
}

/// Whole second a sample taken after `elapsed` belongs to
pub fn sample_second(elapsed: Duration) -> u64 {
    elapsed.as_secs()
}

/// Live computation: derives the metrics and records the sample for the current
/// second if that second has none yet.
pub fn record_live(
    series: &mut SpeedSeries,
    stats: &CharacterStats,
    elapsed: Duration,
) -> LiveMetrics {
    let live = compute(stats, elapsed);
    series.record(SpeedSample::new(
        sample_second(elapsed),
        live.net_wpm,
        live.raw_wpm,
    ));
    live
}

/// The configured limit in time mode, otherwise the measured elapsed time rounded
pub fn duration_seconds(config: &TestConfig, elapsed: Duration) -> u64 {
    match (config.mode(), config.time_limit_secs()) {
        (Mode::Time, Some(limit)) => limit,
        _ => elapsed.as_secs_f64().round() as u64,
    }
}

/// Final computation: seals the duration and closes the series with a terminal sample
pub fn finalize(
    config: &TestConfig,
    stats: &CharacterStats,
    series: &mut SpeedSeries,
    elapsed: Duration,
) -> FinalMetrics {
    let live = compute(stats, elapsed);
    let duration_secs = duration_seconds(config, elapsed);
    series.record(SpeedSample::new(duration_secs, live.net_wpm, live.raw_wpm));

    FinalMetrics {
        live,
        consistency: consistency(&series.net_wpm_values()),
        duration_secs,
    }
}
