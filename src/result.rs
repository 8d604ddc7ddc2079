use crate::metrics::FinalMetrics;
use crate::session::{CharacterStats, Mode};
use crate::time_series::SpeedSample;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Outcome of a finished test. Built exactly once, when the test completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub mode: Mode,
    pub wpm: u32,
    pub raw_wpm: u32,
    pub accuracy: u32,
    pub consistency: f64,
    pub cpm: u32,
    pub duration_secs: u64,
    pub speed_samples: Vec<SpeedSample>,
    pub error_count: usize,
    pub character_count: usize,
    pub character_stats: CharacterStats,
    /// Texts finished cleanly and swapped out during a time test
    pub texts_completed: usize,
}

impl TestResult {
    pub fn new(
        mode: Mode,
        metrics: FinalMetrics,
        stats: CharacterStats,
        samples: &[SpeedSample],
        texts_completed: usize,
    ) -> Self {
        Self {
            mode,
            wpm: metrics.live.net_wpm,
            raw_wpm: metrics.live.raw_wpm,
            accuracy: metrics.live.accuracy,
            consistency: metrics.consistency,
            cpm: metrics.live.cpm,
            duration_secs: metrics.duration_secs,
            speed_samples: samples.to_vec(),
            error_count: stats.incorrect,
            character_count: stats.correct + stats.incorrect + stats.extra,
            character_stats: stats,
            texts_completed,
        }
    }

    /// The flat record handed to the persistence collaborator
    pub fn record(&self) -> ResultRecord {
        ResultRecord {
            wpm: self.wpm,
            accuracy: self.accuracy,
            duration: self.duration_secs,
            errors: self.error_count,
            characters: self.character_count,
            mode: self.mode.to_string(),
            recorded_at: Local::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub wpm: u32,
    pub accuracy: u32,
    pub duration: u64,
    pub errors: usize,
    pub characters: usize,
    pub mode: String,
    pub recorded_at: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::LiveMetrics;

    fn sample_result() -> TestResult {
        let metrics = FinalMetrics {
            live: LiveMetrics {
                net_wpm: 48,
                raw_wpm: 52,
                accuracy: 92,
                cpm: 260,
            },
            consistency: 81.5,
            duration_secs: 30,
        };
        let stats = CharacterStats {
            correct: 120,
            incorrect: 10,
            extra: 2,
            missed: 0,
        };
        TestResult::new(
            Mode::Time,
            metrics,
            stats,
            &[SpeedSample::new(0, 0, 0), SpeedSample::new(30, 48, 52)],
            3,
        )
    }

    #[test]
    fn test_result_counts() {
        let result = sample_result();

        assert_eq!(result.wpm, 48);
        assert_eq!(result.error_count, 10);
        assert_eq!(result.character_count, 132);
        assert_eq!(result.speed_samples.len(), 2);
        assert_eq!(result.texts_completed, 3);
    }

    #[test]
    fn test_record_flattens_result() {
        let record = sample_result().record();

        assert_eq!(record.wpm, 48);
        assert_eq!(record.accuracy, 92);
        assert_eq!(record.duration, 30);
        assert_eq!(record.errors, 10);
        assert_eq!(record.characters, 132);
        assert_eq!(record.mode, "time");
    }

    #[test]
    fn test_result_serializes_to_json() {
        let json = serde_json::to_string(&sample_result()).unwrap();
        assert!(json.contains("\"mode\":\"time\""));
        let back: TestResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample_result());
    }
}
