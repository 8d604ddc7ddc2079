use crate::error::{Error, Result};
use crate::metrics::LiveMetrics;
use crate::time_series::SpeedSeries;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const TIME_LIMITS: [u64; 4] = [15, 30, 60, 120];
pub const WORD_COUNTS: [usize; 4] = [10, 25, 50, 100];

pub const DEFAULT_TIME_LIMIT: u64 = 30;
pub const DEFAULT_WORD_COUNT: usize = 25;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Time,
    Words,
    Quote,
    Custom,
}

/// Parameters of a single test. Only constructible through the validating constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestConfig {
    mode: Mode,
    time_limit_secs: Option<u64>,
    word_count: Option<usize>,
    custom_text: Option<String>,
}

impl TestConfig {
    pub fn time(limit_secs: u64) -> Result<Self> {
        if !TIME_LIMITS.contains(&limit_secs) {
            return Err(Error::InvalidTimeLimit(limit_secs));
        }
        Ok(Self {
            mode: Mode::Time,
            time_limit_secs: Some(limit_secs),
            word_count: None,
            custom_text: None,
        })
    }

    pub fn words(count: usize) -> Result<Self> {
        if !WORD_COUNTS.contains(&count) {
            return Err(Error::InvalidWordCount(count));
        }
        Ok(Self {
            mode: Mode::Words,
            time_limit_secs: None,
            word_count: Some(count),
            custom_text: None,
        })
    }

    pub fn quote() -> Self {
        Self {
            mode: Mode::Quote,
            time_limit_secs: None,
            word_count: None,
            custom_text: None,
        }
    }

    pub fn custom(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(Error::EmptyCustomText);
        }
        Ok(Self {
            mode: Mode::Custom,
            time_limit_secs: None,
            word_count: None,
            custom_text: Some(text),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_secs
    }

    pub fn word_count(&self) -> Option<usize> {
        self.word_count
    }

    pub fn custom_text(&self) -> Option<&str> {
        self.custom_text.as_deref()
    }

    /// The numeric parameter handed to text generation: the time limit or the word count
    pub fn parameter(&self) -> usize {
        self.time_limit_secs
            .map(|secs| secs as usize)
            .or(self.word_count)
            .unwrap_or(0)
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Time,
            time_limit_secs: Some(DEFAULT_TIME_LIMIT),
            word_count: None,
            custom_text: None,
        }
    }
}

/// Running diff counts for the current target text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub correct: usize,
    pub incorrect: usize,
    pub extra: usize,
    pub missed: usize,
}

impl CharacterStats {
    /// Characters compared against the target (correct + incorrect)
    pub fn classified(&self) -> usize {
        self.correct + self.incorrect
    }

    pub fn total(&self) -> usize {
        self.correct + self.incorrect + self.extra + self.missed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Active,
    Complete,
}

/// Display classification of a single target/typed position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharState {
    Pending,
    Correct,
    Incorrect,
    Extra,
}

/// The mutable aggregate of a running test. Only the engine mutates it.
#[derive(Debug, Clone)]
pub struct TestSession {
    pub config: TestConfig,
    pub target: Vec<char>,
    pub typed: Vec<char>,
    pub stats: CharacterStats,
    pub samples: SpeedSeries,
    pub started_at: Option<Instant>,
    pub clock_value: u64,
    pub phase: Phase,
    pub live: LiveMetrics,
    pub texts_completed: usize,
}

impl TestSession {
    pub fn new(config: TestConfig, target_text: &str) -> Self {
        let clock_value = config.time_limit_secs().unwrap_or(0);
        Self {
            config,
            target: target_text.chars().collect(),
            typed: Vec::new(),
            stats: CharacterStats::default(),
            samples: SpeedSeries::new(),
            started_at: None,
            clock_value,
            phase: Phase::Idle,
            live: LiveMetrics::default(),
            texts_completed: 0,
        }
    }

    pub fn target_text(&self) -> String {
        self.target.iter().collect()
    }

    pub fn typed_text(&self) -> String {
        self.typed.iter().collect()
    }

    /// Any in-bounds typed position that differs from the target
    pub fn has_uncorrected_error(&self) -> bool {
        self.typed
            .iter()
            .zip(self.target.iter())
            .any(|(typed, expected)| typed != expected)
    }

    /// Per-position classification for rendering: one entry per target char,
    /// followed by one per extra typed char.
    pub fn char_states(&self) -> Vec<CharState> {
        let mut states: Vec<CharState> = self
            .target
            .iter()
            .enumerate()
            .map(|(idx, expected)| match self.typed.get(idx) {
                None => CharState::Pending,
                Some(c) if c == expected => CharState::Correct,
                Some(_) => CharState::Incorrect,
            })
            .collect();
        let extra = self.typed.len().saturating_sub(self.target.len());
        states.extend(std::iter::repeat(CharState::Extra).take(extra));
        states
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }
}
