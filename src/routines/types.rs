use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::parts::Direction;

/// One entry of a routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Drive a part. Sequential moves wait for the motion to finish before the
    /// next step; concurrent ones only issue it.
    Move {
        part: String,
        direction: Direction,
        duration: Option<Duration>,
        concurrent: bool,
    },
    /// Wait between steps. Interrupted immediately by a stop.
    Pause(Duration),
}

impl Step {
    pub fn movement(part: &str, direction: Direction) -> Self {
        Step::Move {
            part: part.to_string(),
            direction,
            duration: None,
            concurrent: false,
        }
    }

    /// Whether executing this step can take any time at all.
    pub fn waits(&self) -> bool {
        match self {
            Step::Move { concurrent, .. } => !concurrent,
            Step::Pause(duration) => !duration.is_zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineDefinition {
    pub name: String,
    pub steps: Vec<Step>,
    /// Restart from the first step after the last one until stopped.
    pub looping: bool,
}

impl RoutineDefinition {
    pub fn new(name: &str, steps: Vec<Step>) -> Self {
        Self {
            name: name.to_string(),
            steps,
            looping: false,
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }
}
