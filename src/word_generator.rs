use crate::corpus;
use crate::session::{Mode, TestConfig};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Word count for a time test, drawn from a bucket keyed by the limit so the text
/// outlasts the timer without being wastefully long.
pub fn word_count_for_time_limit<R: Rng + ?Sized>(limit_secs: usize, rng: &mut R) -> usize {
    match limit_secs {
        0..=15 => rng.gen_range(8..=10),
        16..=30 => rng.gen_range(15..=19),
        31..=60 => rng.gen_range(25..=34),
        _ => rng.gen_range(40..=54),
    }
}

/// `count` words drawn uniformly with replacement, space-joined
pub fn random_words<R: Rng + ?Sized>(count: usize, rng: &mut R) -> String {
    let words = &corpus::common_words().words;
    (0..count)
        .filter_map(|_| words.choose(&mut *rng))
        .join(" ")
}

/// Target text for `mode`. `parameter` is the time limit (time) or word count (words).
pub fn generate<R: Rng + ?Sized>(
    mode: Mode,
    parameter: usize,
    custom_text: Option<&str>,
    rng: &mut R,
) -> String {
    match mode {
        Mode::Custom => custom_text.unwrap_or_default().to_string(),
        Mode::Quote => corpus::quotes()
            .quotes
            .choose(rng)
            .cloned()
            .unwrap_or_default(),
        Mode::Words => random_words(parameter, rng),
        Mode::Time => {
            let count = word_count_for_time_limit(parameter, rng);
            random_words(count, rng)
        }
    }
}

/// Where the engine gets target text from
pub trait TextSource {
    fn next_text(&mut self, config: &TestConfig) -> String;
}

/// Production text source backed by the embedded corpus
pub struct RandomText<R: Rng = StdRng> {
    rng: R,
}

impl RandomText<StdRng> {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomText<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> TextSource for RandomText<R> {
    fn next_text(&mut self, config: &TestConfig) -> String {
        generate(
            config.mode(),
            config.parameter(),
            config.custom_text(),
            &mut self.rng,
        )
    }
}

/// Scripted text source: hands out the given texts in order, cycling.
/// Custom configs still get their own text back.
#[derive(Debug, Clone)]
pub struct FixedText {
    texts: Vec<String>,
    next: usize,
}

impl FixedText {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }
}

impl TextSource for FixedText {
    fn next_text(&mut self, config: &TestConfig) -> String {
        if let Some(custom) = config.custom_text() {
            return custom.to_string();
        }
        if self.texts.is_empty() {
            return String::new();
        }
        let text = self.texts[self.next % self.texts.len()].clone();
        self.next += 1;
        text
    }
}
