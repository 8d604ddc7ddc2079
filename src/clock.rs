use crate::session::{Mode, TestConfig};
use crate::typing_policy::CompletionPolicy;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockDirection {
    /// Remaining seconds, time tests only
    CountDown,
    /// Elapsed seconds with no ceiling
    CountUp,
}

impl ClockDirection {
    /// Modes that complete on the clock count down, the rest count up
    pub fn for_mode(mode: Mode) -> Self {
        if CompletionPolicy::for_mode(mode).completes_on_clock {
            ClockDirection::CountDown
        } else {
            ClockDirection::CountUp
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    Running(u64),
    /// Countdown reached zero; the driver has stopped itself
    Expired,
    /// Tick delivered to a cancelled driver
    Stopped,
}

/// One-second tick driver for an active test. A new instance is started every
/// time a test becomes active; once cancelled it never ticks again.
#[derive(Debug, Clone)]
pub struct ClockDriver {
    direction: ClockDirection,
    value: u64,
    started_at: Instant,
    ticks: u64,
    cancelled: bool,
}

impl ClockDriver {
    pub fn start(config: &TestConfig, started_at: Instant) -> Self {
        let direction = ClockDirection::for_mode(config.mode());
        let value = match direction {
            ClockDirection::CountDown => config.time_limit_secs().unwrap_or(0),
            ClockDirection::CountUp => 0,
        };
        tracing::trace!(?direction, value, "clock started");
        Self {
            direction,
            value,
            started_at,
            ticks: 0,
            cancelled: false,
        }
    }

    pub fn tick(&mut self) -> ClockSignal {
        if self.cancelled {
            return ClockSignal::Stopped;
        }
        self.ticks += 1;
        match self.direction {
            ClockDirection::CountUp => {
                self.value += 1;
                ClockSignal::Running(self.value)
            }
            ClockDirection::CountDown => {
                self.value = self.value.saturating_sub(1);
                if self.value == 0 {
                    self.cancelled = true;
                    ClockSignal::Expired
                } else {
                    ClockSignal::Running(self.value)
                }
            }
        }
    }

    /// Ticks owed by wall-clock time that have not been delivered yet
    pub fn due_ticks(&self, now: Instant) -> u64 {
        if self.cancelled {
            return 0;
        }
        let elapsed = now.saturating_duration_since(self.started_at).as_secs();
        elapsed.saturating_sub(self.ticks)
    }

    /// Idempotent
    pub fn cancel(&mut self) {
        if !self.cancelled {
            tracing::trace!(ticks = self.ticks, "clock cancelled");
        }
        self.cancelled = true;
    }

    pub fn is_running(&self) -> bool {
        !self.cancelled
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Instant the most recently delivered tick stands for, which may lag the
    /// time it was delivered at
    pub fn last_tick_at(&self) -> Instant {
        self.started_at + Duration::from_secs(self.ticks)
    }
}
