use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Configuration problems. All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: &'static str },

    #[error("duplicate part name '{0}'")]
    DuplicatePart(String),

    #[error("duplicate routine name '{0}'")]
    DuplicateRoutine(String),

    #[error("part '{part}' has a non-positive moving duration")]
    NonPositiveDuration { part: String },

    #[error("part '{part}' moving duration {duration:?} exceeds the {limit:?} limit")]
    DurationTooLong {
        part: String,
        duration: Duration,
        limit: Duration,
    },

    #[error("part '{part}' cool-down {duration:?} exceeds the {limit:?} limit")]
    CoolDownTooLong {
        part: String,
        duration: Duration,
        limit: Duration,
    },

    #[error("part '{part}' uses GPIO line {line} for both directions")]
    SameLine { part: String, line: u32 },

    #[error("GPIO line {line} is bound to both '{first}' and '{second}'")]
    SharedLine {
        line: u32,
        first: String,
        second: String,
    },

    #[error("part '{0}' cannot move in any direction")]
    NoDirections(String),

    #[error("routine '{routine}' step {step} names unknown part '{part}'")]
    UnknownPart {
        routine: String,
        step: usize,
        part: String,
    },

    #[error("routine '{routine}' step {step} moves '{part}' in a direction it does not support")]
    UnsupportedDirection {
        routine: String,
        step: usize,
        part: String,
    },

    #[error("routine '{routine}' step {step}: {reason}")]
    InvalidStep {
        routine: String,
        step: usize,
        reason: String,
    },

    #[error("looping routine '{0}' never waits between cycles")]
    LoopWithoutWait(String),

    #[error("invalid direction '{0}'")]
    InvalidDirection(String),

    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}
