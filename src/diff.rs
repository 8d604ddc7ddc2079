//! Per-keystroke classification of typed characters against the target text.
//!
//! Counting is forward-only: a position is classified once when it is typed and
//! later backspaces never revisit it.

use crate::session::CharacterStats;

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    Extra,
}

/// Classifies `typed` as the character appended at `position`
/// (the typed length before the append).
pub fn classify(target: &[char], position: usize, typed: char) -> Outcome {
    match target.get(position) {
        None => Outcome::Extra,
        Some(expected) if *expected == typed => Outcome::Correct,
        Some(_) => Outcome::Incorrect,
    }
}

/// Returns the counters after applying one classified keystroke.
///
/// `missed` is only recomputed when the keystroke lands on the last in-bounds position.
pub fn apply(
    stats: CharacterStats,
    target_len: usize,
    position: usize,
    typed_len_after: usize,
    outcome: Outcome,
) -> CharacterStats {
    let mut next = stats;
    match outcome {
        Outcome::Correct => next.correct += 1,
        Outcome::Incorrect => next.incorrect += 1,
        Outcome::Extra => {
            next.extra += 1;
            return next;
        }
    }

    if target_len > 0 && position == target_len - 1 {
        next.missed = target_len.saturating_sub(typed_len_after);
    }
    next
}

/// Classifies and applies in one step, returning the outcome and the new counters
pub fn record(
    stats: CharacterStats,
    target: &[char],
    position: usize,
    typed: char,
) -> (Outcome, CharacterStats) {
    let outcome = classify(target, position, typed);
    let next = apply(stats, target.len(), position, position + 1, outcome);
    (outcome, next)
}
