//! Mode-specific completion rules, kept in one table keyed by mode.

use crate::session::{Mode, TestSession};

/// What reaching the end of the target text means for a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfText {
    /// Swap in fresh text when the current text is clean, otherwise finish
    RegenerateIfClean,
    /// Keep accepting keystrokes as extras
    KeepTyping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionPolicy {
    pub end_of_text: EndOfText,
    pub accepts_terminator: bool,
    pub completes_on_word_goal: bool,
    pub completes_on_clock: bool,
}

impl CompletionPolicy {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Time => CompletionPolicy {
                end_of_text: EndOfText::RegenerateIfClean,
                accepts_terminator: false,
                completes_on_word_goal: false,
                completes_on_clock: true,
            },
            Mode::Words => CompletionPolicy {
                end_of_text: EndOfText::KeepTyping,
                accepts_terminator: true,
                completes_on_word_goal: true,
                completes_on_clock: false,
            },
            Mode::Quote | Mode::Custom => CompletionPolicy {
                end_of_text: EndOfText::KeepTyping,
                accepts_terminator: true,
                completes_on_word_goal: false,
                completes_on_clock: false,
            },
        }
    }
}

/// Decision taken after a character has been classified and appended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterKeystroke {
    Continue,
    Regenerate,
    Complete,
}

/// Words the user has finished: runs of non-whitespace closed by whitespace, plus the
/// final run once the typed text has reached the end of the target.
pub fn completed_words(typed: &[char], target_len: usize) -> usize {
    let mut count = 0;
    let mut in_word = false;
    for c in typed {
        if c.is_whitespace() {
            if in_word {
                count += 1;
            }
            in_word = false;
        } else {
            in_word = true;
        }
    }
    if in_word && typed.len() >= target_len {
        count += 1;
    }
    count
}

pub fn after_keystroke(session: &TestSession) -> AfterKeystroke {
    let policy = CompletionPolicy::for_mode(session.config.mode());

    if policy.completes_on_word_goal {
        if let Some(goal) = session.config.word_count() {
            if completed_words(&session.typed, session.target.len()) >= goal {
                return AfterKeystroke::Complete;
            }
        }
    }

    if session.typed.len() >= session.target.len() {
        return match policy.end_of_text {
            EndOfText::RegenerateIfClean if session.has_uncorrected_error() => {
                AfterKeystroke::Complete
            }
            EndOfText::RegenerateIfClean => AfterKeystroke::Regenerate,
            EndOfText::KeepTyping => AfterKeystroke::Continue,
        };
    }

    AfterKeystroke::Continue
}
