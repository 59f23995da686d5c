use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which way a part moves. Speech says "raise"/"lower", device files say "up"/"down".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Raise,
    Lower,
}

impl Direction {
    /// Present participle used in spoken responses ("lowering the back").
    pub fn progressive(self) -> &'static str {
        match self {
            Direction::Raise => "raising",
            Direction::Lower => "lowering",
        }
    }

    pub fn past_participle(self) -> &'static str {
        match self {
            Direction::Raise => "raised",
            Direction::Lower => "lowered",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Raise => Direction::Lower,
            Direction::Lower => Direction::Raise,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Raise => f.write_str("raise"),
            Direction::Lower => f.write_str("lower"),
        }
    }
}

impl FromStr for Direction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raise" | "up" => Ok(Direction::Raise),
            "lower" | "down" => Ok(Direction::Lower),
            other => Err(ConfigError::InvalidDirection(other.to_string())),
        }
    }
}

/// Directions a part is physically able to move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub raise: bool,
    pub lower: bool,
}

impl Capability {
    pub const BOTH: Capability = Capability { raise: true, lower: true };

    pub fn allows(&self, direction: Direction) -> bool {
        match direction {
            Direction::Raise => self.raise,
            Direction::Lower => self.lower,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.raise && !self.lower
    }
}

impl Default for Capability {
    fn default() -> Self {
        Self::BOTH
    }
}

/// Output lines that drive a part's motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineBinding {
    pub up: u32,
    pub down: u32,
}

impl LineBinding {
    pub fn line_for(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Raise => self.up,
            Direction::Lower => self.down,
        }
    }
}

/// A named, independently actuatable section of the bed. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub capability: Capability,
    pub duration: Duration,
    /// Dwell with both lines inactive after any stop, before the next drive.
    pub cool_down: Duration,
    pub binding: LineBinding,
}

impl Part {
    pub fn supports(&self, direction: Direction) -> bool {
        self.capability.allows(direction)
    }
}
