// Library surface for the binary, headless runs and integration tests.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod corpus;
pub mod diff;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod result;
pub mod runtime;
pub mod session;
pub mod store;
pub mod time_series;
pub mod typing_policy;
pub mod word_generator;

pub use engine::{Keystroke, Step, TestEngine};
pub use error::{Error, Result};
pub use result::{ResultRecord, TestResult};
pub use session::{CharacterStats, Mode, Phase, TestConfig, TestSession};
