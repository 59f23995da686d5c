use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::parts::Direction;

/// Monotonic counter stamped on every Actuating state of a part.
/// A duration timer may only stop the actuation carrying its epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

/// Who owns a movement. Two moves conflict when direction or owner differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActuationContext {
    /// A spoken command from the user.
    Direct,
    /// A step of one specific routine run.
    Routine { name: String, instance: Uuid },
}

impl ActuationContext {
    pub fn is_direct(&self) -> bool {
        matches!(self, ActuationContext::Direct)
    }
}

impl fmt::Display for ActuationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuationContext::Direct => f.write_str("direct"),
            ActuationContext::Routine { name, .. } => write!(f, "routine:{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actuation {
    pub direction: Direction,
    pub context: ActuationContext,
    pub started_at: Instant,
    pub deadline: Instant,
    pub epoch: Epoch,
}

impl Actuation {
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }
}

/// Runtime state of one part. Mutated only by the actuation controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PartState {
    #[default]
    Idle,
    Actuating(Actuation),
}

impl PartState {
    pub fn is_idle(&self) -> bool {
        matches!(self, PartState::Idle)
    }

    pub fn actuation(&self) -> Option<&Actuation> {
        match self {
            PartState::Idle => None,
            PartState::Actuating(actuation) => Some(actuation),
        }
    }
}

/// A single movement request. Transient: consumed by the controller.
#[derive(Debug, Clone)]
pub struct ActuationRequest {
    pub part: String,
    pub direction: Direction,
    pub context: ActuationContext,
    /// Shorter run than the part's configured duration. Never longer.
    pub duration: Option<Duration>,
    pub requested_at: Instant,
}

impl ActuationRequest {
    pub fn new(part: &str, direction: Direction, context: ActuationContext) -> Self {
        Self {
            part: part.to_string(),
            direction,
            context,
            duration: None,
            requested_at: Instant::now(),
        }
    }

    pub fn direct(part: &str, direction: Direction) -> Self {
        Self::new(part, direction, ActuationContext::Direct)
    }

    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }
}
