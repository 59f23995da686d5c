use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::state::{ActuationContext, Epoch};
use crate::parts::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The configured duration ran out.
    Elapsed,
    /// A conflicting request replaced the motion.
    Preempted,
    /// Someone asked for the stop (shutdown, explicit stop).
    Requested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Completed,
    Stopped,
    /// A looping routine whose every step failed.
    Faulted,
}

/// Things the kernel did, for observers outside the request path.
/// Carries names and ids only, never intent text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KernelEvent {
    PartStarted {
        part: String,
        direction: Direction,
        context: ActuationContext,
        epoch: Epoch,
    },
    PartStopped {
        part: String,
        reason: StopReason,
    },
    DriverFault {
        part: String,
    },
    RoutineStarted {
        name: String,
        instance: Uuid,
    },
    RoutineStepSuperseded {
        name: String,
        step: usize,
        part: String,
    },
    RoutineFinished {
        name: String,
        instance: Uuid,
        reason: FinishReason,
    },
}

/// Non-blocking outlet for kernel events. Safe to use while holding a part lock.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<KernelEvent>>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<KernelEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: KernelEvent) {
        if let Some(tx) = &self.tx {
            // Receiver gone means nobody is observing; that is fine.
            let _ = tx.send(event);
        }
    }
}
