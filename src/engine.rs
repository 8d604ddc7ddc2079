use crate::clock::{ClockDriver, ClockSignal};
use crate::diff;
use crate::metrics;
use crate::result::TestResult;
use crate::session::{Phase, TestConfig, TestSession};
use crate::typing_policy::{after_keystroke, AfterKeystroke, CompletionPolicy};
use crate::word_generator::{RandomText, TextSource};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Input events delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Backspace,
    /// End-of-input signal (Enter in the terminal front end)
    Terminator,
}

/// What a handled event did to the test
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The event had no effect in the current phase
    Ignored,
    /// First character of the test; the clock is now running
    Started,
    Accepted,
    /// Time test swapped in fresh text after a clean finish
    Regenerated,
    /// The test finished with this event. Emitted exactly once per test.
    Completed(TestResult),
}

/// Drives a typing test: owns the session, routes keystrokes and ticks, and
/// seals the result once.
pub struct TestEngine {
    session: TestSession,
    clock: Option<ClockDriver>,
    result: Option<TestResult>,
    text_source: Box<dyn TextSource>,
}

impl std::fmt::Debug for TestEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestEngine")
            .field("session", &self.session)
            .field("clock", &self.clock)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

impl TestEngine {
    pub fn new(config: TestConfig) -> Self {
        Self::with_source(config, Box::new(RandomText::new()))
    }

    pub fn with_source(config: TestConfig, mut text_source: Box<dyn TextSource>) -> Self {
        let text = text_source.next_text(&config);
        Self {
            session: TestSession::new(config, &text),
            clock: None,
            result: None,
            text_source,
        }
    }

    /// Read-only snapshot for display
    pub fn session(&self) -> &TestSession {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn config(&self) -> &TestConfig {
        &self.session.config
    }

    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    pub fn clock_running(&self) -> bool {
        self.clock.as_ref().is_some_and(ClockDriver::is_running)
    }

    /// Re-initialises every field for `config` and returns to idle with fresh text
    pub fn reset(&mut self, config: TestConfig) {
        self.stop_clock();
        let text = self.text_source.next_text(&config);
        debug!(mode = %config.mode(), len = text.chars().count(), "test reset");
        self.session = TestSession::new(config, &text);
        self.result = None;
    }

    /// Reset keeping the current configuration
    pub fn restart(&mut self) {
        let config = self.session.config.clone();
        self.reset(config);
    }

    pub fn handle_keystroke(&mut self, key: Keystroke, now: Instant) -> Step {
        match (self.session.phase, key) {
            (Phase::Complete, _) => Step::Ignored,
            (_, Keystroke::Char(c)) => self.type_char(c, now),
            (Phase::Active, Keystroke::Backspace) => {
                if self.session.typed.pop().is_some() {
                    Step::Accepted
                } else {
                    Step::Ignored
                }
            }
            (Phase::Active, Keystroke::Terminator) => {
                if CompletionPolicy::for_mode(self.session.config.mode()).accepts_terminator {
                    self.complete(now)
                } else {
                    Step::Ignored
                }
            }
            (Phase::Idle, _) => Step::Ignored,
        }
    }

    /// Delivers one clock tick. Ticks outside an active test are no-ops.
    pub fn tick(&mut self, now: Instant) -> Step {
        if self.session.phase != Phase::Active {
            return Step::Ignored;
        }
        let Some(clock) = self.clock.as_mut() else {
            return Step::Ignored;
        };

        let signal = clock.tick();
        let tick_at = clock.last_tick_at();
        self.session.clock_value = clock.value();
        let policy = CompletionPolicy::for_mode(self.session.config.mode());
        match signal {
            // a late catch-up still seals the test at the second the clock ran out
            ClockSignal::Expired if policy.completes_on_clock => {
                debug!(late_by = ?now.saturating_duration_since(tick_at), "clock expired");
                self.complete(tick_at)
            }
            ClockSignal::Running(_) => Step::Accepted,
            ClockSignal::Expired | ClockSignal::Stopped => Step::Ignored,
        }
    }

    /// Delivers every tick owed by wall-clock time since the test started
    pub fn catch_up(&mut self, now: Instant) -> Step {
        let due = self.clock.as_ref().map_or(0, |c| c.due_ticks(now));
        let mut last = Step::Ignored;
        for _ in 0..due {
            last = self.tick(now);
            if matches!(last, Step::Completed(_)) {
                break;
            }
        }
        last
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.session
            .started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }

    fn begin(&mut self, now: Instant) {
        self.session.started_at = Some(now);
        self.session.phase = Phase::Active;
        self.clock = Some(ClockDriver::start(&self.session.config, now));
        debug!(mode = %self.session.config.mode(), "test started");
    }

    fn type_char(&mut self, c: char, now: Instant) -> Step {
        let started = self.session.phase == Phase::Idle;
        if started {
            self.begin(now);
        }

        let position = self.session.typed.len();
        let (_outcome, stats) = diff::record(self.session.stats, &self.session.target, position, c);
        self.session.typed.push(c);
        self.session.stats = stats;

        let elapsed = self.elapsed(now);
        self.session.live = metrics::record_live(&mut self.session.samples, &stats, elapsed);

        match after_keystroke(&self.session) {
            AfterKeystroke::Complete => self.complete(now),
            AfterKeystroke::Regenerate => {
                self.regenerate();
                Step::Regenerated
            }
            AfterKeystroke::Continue if started => Step::Started,
            AfterKeystroke::Continue => Step::Accepted,
        }
    }

    fn regenerate(&mut self) {
        let text = self.text_source.next_text(&self.session.config);
        self.session.target = text.chars().collect();
        self.session.typed.clear();
        self.session.stats = Default::default();
        self.session.texts_completed += 1;
        debug!(
            texts_completed = self.session.texts_completed,
            "text regenerated mid-test"
        );
    }

    fn complete(&mut self, now: Instant) -> Step {
        if self.session.phase == Phase::Complete || self.result.is_some() {
            return Step::Ignored;
        }
        self.session.phase = Phase::Complete;
        self.stop_clock();

        let elapsed = self.elapsed(now);
        let session = &mut self.session;
        let sealed = metrics::finalize(
            &session.config,
            &session.stats,
            &mut session.samples,
            elapsed,
        );
        session.live = sealed.live;

        let result = TestResult::new(
            session.config.mode(),
            sealed,
            session.stats,
            session.samples.samples(),
            session.texts_completed,
        );
        info!(
            mode = %result.mode,
            wpm = result.wpm,
            accuracy = result.accuracy,
            duration = result.duration_secs,
            "test complete"
        );
        self.result = Some(result.clone());
        Step::Completed(result)
    }

    fn stop_clock(&mut self) {
        if let Some(mut clock) = self.clock.take() {
            clock.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Mode;
    use crate::word_generator::FixedText;
    use assert_matches::assert_matches;

    fn engine(config: TestConfig, texts: &[&str]) -> TestEngine {
        TestEngine::with_source(config, Box::new(FixedText::new(texts.iter().copied())))
    }

    fn type_str(engine: &mut TestEngine, s: &str, at: Instant) -> Vec<Step> {
        s.chars()
            .map(|c| engine.handle_keystroke(Keystroke::Char(c), at))
            .collect()
    }

    #[test]
    fn test_new_engine_is_idle() {
        let engine = engine(TestConfig::time(30).unwrap(), &["the cat"]);

        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.session().target_text(), "the cat");
        assert_eq!(engine.session().clock_value, 30);
        assert!(!engine.clock_running());
        assert!(engine.result().is_none());
    }

    #[test]
    fn test_first_char_starts_test() {
        let mut engine = engine(TestConfig::quote(), &["abc"]);
        let t0 = Instant::now();

        assert_eq!(engine.handle_keystroke(Keystroke::Char('a'), t0), Step::Started);
        assert_eq!(engine.phase(), Phase::Active);
        assert_eq!(engine.session().started_at, Some(t0));
        assert!(engine.clock_running());
        assert_eq!(
            engine.handle_keystroke(Keystroke::Char('b'), t0),
            Step::Accepted
        );
    }

    #[test]
    fn test_idle_ignores_backspace_terminator_and_ticks() {
        let mut engine = engine(TestConfig::quote(), &["abc"]);
        let t0 = Instant::now();

        assert_eq!(engine.handle_keystroke(Keystroke::Backspace, t0), Step::Ignored);
        assert_eq!(engine.handle_keystroke(Keystroke::Terminator, t0), Step::Ignored);
        assert_eq!(engine.tick(t0), Step::Ignored);
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_backspace_truncates_without_touching_counts() {
        let mut engine = engine(TestConfig::quote(), &["abc"]);
        let t0 = Instant::now();
        type_str(&mut engine, "ax", t0);

        assert_eq!(engine.handle_keystroke(Keystroke::Backspace, t0), Step::Accepted);
        assert_eq!(engine.session().typed_text(), "a");
        assert_eq!(engine.session().stats.incorrect, 1);

        type_str(&mut engine, "b", t0);
        assert_eq!(engine.session().stats.correct, 2);
        assert_eq!(engine.session().stats.incorrect, 1);
    }

    #[test]
    fn test_backspace_on_empty_input_is_ignored() {
        let mut engine = engine(TestConfig::quote(), &["abc"]);
        let t0 = Instant::now();
        type_str(&mut engine, "a", t0);
        engine.handle_keystroke(Keystroke::Backspace, t0);

        assert_eq!(engine.handle_keystroke(Keystroke::Backspace, t0), Step::Ignored);
        assert_eq!(engine.phase(), Phase::Active);
    }

    #[test]
    fn test_terminator_completes_custom_test() {
        let mut engine = engine(TestConfig::custom("hi").unwrap(), &[]);
        let t0 = Instant::now();
        type_str(&mut engine, "hi", t0);

        let step = engine.handle_keystroke(Keystroke::Terminator, t0 + Duration::from_secs(6));
        let result = assert_matches!(step, Step::Completed(r) => r);

        assert_eq!(result.wpm, 4);
        assert_eq!(result.accuracy, 100);
        assert_eq!(result.duration_secs, 6);
        assert_eq!(engine.phase(), Phase::Complete);
        assert!(!engine.clock_running());
    }

    #[test]
    fn test_terminator_ignored_in_time_mode() {
        let mut engine = engine(TestConfig::time(15).unwrap(), &["abc"]);
        let t0 = Instant::now();
        type_str(&mut engine, "a", t0);

        assert_eq!(engine.handle_keystroke(Keystroke::Terminator, t0), Step::Ignored);
        assert_eq!(engine.phase(), Phase::Active);
    }

    #[test]
    fn test_complete_ignores_everything() {
        let mut engine = engine(TestConfig::quote(), &["ab"]);
        let t0 = Instant::now();
        type_str(&mut engine, "ab", t0);
        assert_matches!(
            engine.handle_keystroke(Keystroke::Terminator, t0),
            Step::Completed(_)
        );

        let frozen = engine.session().stats;
        assert_eq!(engine.handle_keystroke(Keystroke::Char('c'), t0), Step::Ignored);
        assert_eq!(engine.handle_keystroke(Keystroke::Backspace, t0), Step::Ignored);
        assert_eq!(engine.handle_keystroke(Keystroke::Terminator, t0), Step::Ignored);
        assert_eq!(engine.tick(t0), Step::Ignored);
        assert_eq!(engine.session().stats, frozen);
    }

    #[test]
    fn test_completion_latch_emits_once() {
        let mut engine = engine(TestConfig::quote(), &["ab"]);
        let t0 = Instant::now();
        type_str(&mut engine, "a", t0);

        let first = engine.complete(t0 + Duration::from_secs(2));
        let second = engine.complete(t0 + Duration::from_secs(9));

        assert_matches!(first, Step::Completed(_));
        assert_eq!(second, Step::Ignored);
        assert_eq!(engine.result().unwrap().duration_secs, 2);
    }

    #[test]
    fn test_time_mode_regenerates_on_clean_finish() {
        let mut engine = engine(TestConfig::time(30).unwrap(), &["ab", "cd"]);
        let t0 = Instant::now();

        let steps = type_str(&mut engine, "ab", t0);
        assert_eq!(steps.last(), Some(&Step::Regenerated));
        assert_eq!(engine.session().target_text(), "cd");
        assert_eq!(engine.session().typed_text(), "");
        assert_eq!(engine.session().stats, Default::default());
        assert_eq!(engine.session().texts_completed, 1);
        assert_eq!(engine.session().started_at, Some(t0));
        assert_eq!(engine.phase(), Phase::Active);
    }

    #[test]
    fn test_time_mode_ends_on_dirty_finish() {
        let mut engine = engine(TestConfig::time(30).unwrap(), &["ab", "cd"]);
        let t0 = Instant::now();

        let steps = type_str(&mut engine, "xb", t0 + Duration::from_secs(1));
        let result = assert_matches!(steps.last(), Some(Step::Completed(r)) => r);

        assert_eq!(result.duration_secs, 30);
        assert_eq!(result.error_count, 1);
        assert_eq!(engine.session().target_text(), "ab");
    }

    #[test]
    fn test_time_mode_clock_expiry_completes() {
        let mut engine = engine(TestConfig::time(15).unwrap(), &["abcdefghij"]);
        let t0 = Instant::now();
        type_str(&mut engine, "abcde", t0);

        for sec in 1..15 {
            assert_eq!(engine.tick(t0 + Duration::from_secs(sec)), Step::Accepted);
        }
        assert_eq!(engine.session().clock_value, 1);

        let step = engine.tick(t0 + Duration::from_secs(15));
        let result = assert_matches!(step, Step::Completed(r) => r);
        assert_eq!(result.duration_secs, 15);
        assert_eq!(result.wpm, 4);
        assert_eq!(engine.session().clock_value, 0);
        assert!(!engine.clock_running());
    }

    #[test]
    fn test_count_up_clock_in_words_mode() {
        let mut engine = engine(TestConfig::words(10).unwrap(), &["a b c d e f g h i j"]);
        let t0 = Instant::now();
        type_str(&mut engine, "a", t0);

        engine.tick(t0 + Duration::from_secs(1));
        engine.tick(t0 + Duration::from_secs(2));
        assert_eq!(engine.session().clock_value, 2);
    }

    #[test]
    fn test_catch_up_delivers_owed_ticks() {
        let text = "abcdefghijklmnopqrstuvwxyzabcd";
        let mut engine = engine(TestConfig::time(15).unwrap(), &[text]);
        let t0 = Instant::now();
        for (i, c) in text.chars().take(25).enumerate() {
            engine.handle_keystroke(Keystroke::Char(c), t0 + Duration::from_millis(100 * i as u64));
        }

        assert_eq!(engine.catch_up(t0 + Duration::from_millis(3_500)), Step::Accepted);
        assert_eq!(engine.session().clock_value, 12);

        // delivered 25s late, the result is still measured over the 15s the clock ran
        let step = engine.catch_up(t0 + Duration::from_secs(40));
        let result = assert_matches!(step, Step::Completed(r) => r);
        assert_eq!(result.duration_secs, 15);
        assert_eq!(result.wpm, 20);
        assert_eq!(
            result.speed_samples.last().copied(),
            Some(crate::time_series::SpeedSample::new(15, 20, 20))
        );
        assert_eq!(engine.session().clock_value, 0);
        assert_eq!(engine.catch_up(t0 + Duration::from_secs(50)), Step::Ignored);
    }

    #[test]
    fn test_reset_returns_to_idle_and_stops_clock() {
        let mut engine = engine(TestConfig::quote(), &["abc", "def"]);
        let t0 = Instant::now();
        type_str(&mut engine, "ab", t0 + Duration::from_secs(2));

        engine.reset(TestConfig::time(60).unwrap());

        let session = engine.session();
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.config.mode(), Mode::Time);
        assert_eq!(session.target_text(), "def");
        assert!(session.typed.is_empty());
        assert!(session.samples.is_empty());
        assert_eq!(session.clock_value, 60);
        assert!(session.started_at.is_none());
        assert!(!engine.clock_running());
        assert_eq!(engine.tick(t0 + Duration::from_secs(3)), Step::Ignored);
    }

    #[test]
    fn test_restart_after_completion_starts_a_fresh_clock() {
        let mut engine = engine(TestConfig::custom("go").unwrap(), &[]);
        let t0 = Instant::now();
        type_str(&mut engine, "go", t0);
        engine.handle_keystroke(Keystroke::Terminator, t0 + Duration::from_secs(1));

        engine.restart();
        assert_eq!(engine.session().target_text(), "go");
        assert!(engine.result().is_none());

        let t1 = t0 + Duration::from_secs(10);
        assert_eq!(engine.handle_keystroke(Keystroke::Char('g'), t1), Step::Started);
        assert!(engine.clock_running());
        assert_eq!(engine.session().clock_value, 0);
        assert_eq!(engine.session().started_at, Some(t1));
    }

    #[test]
    fn test_extra_characters_past_target() {
        let mut engine = engine(TestConfig::quote(), &["hi"]);
        let t0 = Instant::now();
        type_str(&mut engine, "hi!!", t0);

        let stats = engine.session().stats;
        assert_eq!(stats.correct, 2);
        assert_eq!(stats.extra, 2);
        assert_eq!(engine.phase(), Phase::Active);
    }
}
