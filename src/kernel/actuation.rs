//! Per-part actuation with hard timeouts.
//!
//! Every part has its own lock; requests for different parts never contend.
//! Entering `Actuating` arms a timer in the same critical section, and the
//! timer only acts if the part still carries the epoch it was armed with, so
//! a stale timer can never cut short a later movement.
//!
//! Every stop starts the part's cool-down. A drive issued during it waits
//! for the cool-down to end while holding the part's lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::event::{EventSink, KernelEvent, StopReason};
use super::state::{Actuation, ActuationRequest, Epoch, PartState};
use crate::driver::{ActuatorDriver, DriverError};
use crate::parts::{Direction, Part, PartRegistry};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActuationError {
    #[error("no part named '{0}'")]
    UnknownPart(String),

    #[error("part '{part}' cannot {direction}")]
    UnsupportedDirection { part: String, direction: Direction },

    #[error("driver failure on '{part}': {source}")]
    Driver {
        part: String,
        #[source]
        source: DriverError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Accepted,
    /// A conflicting motion was stopped to make room for this one.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    pub outcome: MoveOutcome,
    /// How long the part will keep moving unless something else intervenes.
    pub remaining: Duration,
}

#[derive(Debug, Default)]
struct PartSlot {
    state: PartState,
    epoch: Epoch,
    /// End of the cool-down that follows the last stop.
    quiet_until: Option<Instant>,
}

impl PartSlot {
    /// Record that both lines have just gone inactive.
    fn settle(&mut self, part: &Part, now: Instant) {
        self.state = PartState::Idle;
        self.quiet_until = Some(now + part.cool_down);
    }
}

struct Inner {
    parts: Arc<PartRegistry>,
    slots: HashMap<String, Mutex<PartSlot>>,
    driver: Arc<dyn ActuatorDriver>,
    events: EventSink,
}

/// Sole owner of every part's runtime state. Cheap to clone.
#[derive(Clone)]
pub struct ActuationController {
    inner: Arc<Inner>,
}

impl ActuationController {
    pub fn new(
        parts: Arc<PartRegistry>,
        driver: Arc<dyn ActuatorDriver>,
        events: EventSink,
    ) -> Self {
        let slots = parts
            .iter()
            .map(|part| (part.name.clone(), Mutex::new(PartSlot::default())))
            .collect();
        Self {
            inner: Arc::new(Inner {
                parts,
                slots,
                driver,
                events,
            }),
        }
    }

    pub fn parts(&self) -> &PartRegistry {
        &self.inner.parts
    }

    fn resolve(&self, name: &str) -> Result<(&Part, &Mutex<PartSlot>), ActuationError> {
        let part = self
            .inner
            .parts
            .lookup(name)
            .ok_or_else(|| ActuationError::UnknownPart(name.to_string()))?;
        let slot = self
            .inner
            .slots
            .get(&part.name)
            .ok_or_else(|| ActuationError::UnknownPart(name.to_string()))?;
        Ok((part, slot))
    }

    /// Move a part for its configured duration, resolving conflicts with
    /// whatever it is already doing.
    ///
    /// Same direction and owner: refresh, no new drive. Anything else while
    /// actuating: stop, then drive the new request, and report `Superseded`.
    /// A motion past its deadline whose timer has not fired yet counts as elapsed.
    pub async fn move_part(&self, request: ActuationRequest) -> Result<Movement, ActuationError> {
        let (part, slot) = self.resolve(&request.part)?;
        if !part.supports(request.direction) {
            return Err(ActuationError::UnsupportedDirection {
                part: part.name.clone(),
                direction: request.direction,
            });
        }

        let mut slot = slot.lock().await;
        let now = Instant::now();

        let outcome = match slot.state.actuation().cloned() {
            None => MoveOutcome::Accepted,
            Some(current) if current.deadline <= now => {
                // Overdue: its timer has not run yet, so finish it here.
                debug!(part = %part.name, epoch = current.epoch.0, "Completing overdue motion");
                slot.settle(part, now);
                if let Err(source) = self.inner.driver.stop(part) {
                    return Err(self.fault(part, source));
                }
                self.inner.events.emit(KernelEvent::PartStopped {
                    part: part.name.clone(),
                    reason: StopReason::Elapsed,
                });
                MoveOutcome::Accepted
            }
            Some(current)
                if current.direction == request.direction && current.context == request.context =>
            {
                debug!(part = %part.name, epoch = current.epoch.0, "Refreshing ongoing motion");
                return Ok(Movement {
                    outcome: MoveOutcome::Accepted,
                    remaining: current.remaining(now),
                });
            }
            Some(current) => {
                info!(
                    part = %part.name,
                    from = %current.direction,
                    from_context = %current.context,
                    to = %request.direction,
                    to_context = %request.context,
                    "Preempting motion"
                );
                slot.settle(part, now);
                if let Err(source) = self.inner.driver.stop(part) {
                    return Err(self.fault(part, source));
                }
                self.inner.events.emit(KernelEvent::PartStopped {
                    part: part.name.clone(),
                    reason: StopReason::Preempted,
                });
                MoveOutcome::Superseded
            }
        };

        // The motor never reverses straight out of a stop.
        if let Some(until) = slot.quiet_until.take() {
            let wait = until.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                debug!(part = %part.name, wait_ms = wait.as_millis() as u64, "Cooling down");
                tokio::time::sleep_until(until).await;
            }
        }
        let now = Instant::now();

        let duration = request
            .duration
            .map_or(part.duration, |requested| requested.min(part.duration));
        slot.epoch = slot.epoch.next();
        let epoch = slot.epoch;

        if let Err(source) = self.inner.driver.drive(part, request.direction) {
            // Leave the hardware quiet; state is already Idle.
            slot.settle(part, now);
            if let Err(err) = self.inner.driver.stop(part) {
                warn!(part = %part.name, error = %err, "Stop after failed drive also failed");
            }
            return Err(self.fault(part, source));
        }

        slot.state = PartState::Actuating(Actuation {
            direction: request.direction,
            context: request.context.clone(),
            started_at: now,
            deadline: now + duration,
            epoch,
        });
        self.arm_timer(part.name.clone(), epoch, duration);

        info!(
            part = %part.name,
            direction = %request.direction,
            context = %request.context,
            epoch = epoch.0,
            duration_ms = duration.as_millis() as u64,
            queued_ms = now.saturating_duration_since(request.requested_at).as_millis() as u64,
            "Part actuating"
        );
        self.inner.events.emit(KernelEvent::PartStarted {
            part: part.name.clone(),
            direction: request.direction,
            context: request.context,
            epoch,
        });

        Ok(Movement {
            outcome,
            remaining: duration,
        })
    }

    /// Stop a part. Returns whether it was moving; stopping an idle part is a no-op.
    pub async fn stop_part(&self, name: &str) -> Result<bool, ActuationError> {
        let (part, slot) = self.resolve(name)?;
        let mut slot = slot.lock().await;
        if slot.state.is_idle() {
            return Ok(false);
        }

        slot.settle(part, Instant::now());
        self.inner
            .driver
            .stop(part)
            .map_err(|source| self.fault(part, source))?;

        info!(part = %part.name, "Part stopped on request");
        self.inner.events.emit(KernelEvent::PartStopped {
            part: part.name.clone(),
            reason: StopReason::Requested,
        });
        Ok(true)
    }

    /// Stop every moving part. Failures are logged and do not stop the sweep.
    pub async fn stop_all(&self) {
        for part in self.inner.parts.iter() {
            if let Err(err) = self.stop_part(&part.name).await {
                warn!(part = %part.name, error = %err, "Failed to stop part");
            }
        }
    }

    pub async fn state_of(&self, name: &str) -> Option<PartState> {
        let (_, slot) = self.resolve(name).ok()?;
        let slot = slot.lock().await;
        Some(slot.state.clone())
    }

    /// Parts currently moving, in configuration order.
    pub async fn active(&self) -> Vec<(String, Actuation)> {
        let mut active = Vec::new();
        for part in self.inner.parts.iter() {
            if let Some(slot) = self.inner.slots.get(&part.name) {
                if let PartState::Actuating(actuation) = &slot.lock().await.state {
                    active.push((part.name.clone(), actuation.clone()));
                }
            }
        }
        active
    }

    fn arm_timer(&self, part: String, epoch: Epoch, duration: Duration) {
        let controller = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            controller.expire(&part, epoch).await;
        });
    }

    async fn expire(&self, name: &str, epoch: Epoch) {
        let Ok((part, slot)) = self.resolve(name) else {
            return;
        };
        let mut slot = slot.lock().await;

        let current = slot.state.actuation().map(|a| a.epoch);
        if current != Some(epoch) {
            debug!(part = %part.name, epoch = epoch.0, "Stale duration timer ignored");
            return;
        }

        slot.settle(part, Instant::now());
        if let Err(source) = self.inner.driver.stop(part) {
            let err = self.fault(part, source);
            warn!(error = %err, "Automatic stop failed");
            return;
        }
        info!(part = %part.name, epoch = epoch.0, "Motion duration elapsed");
        self.inner.events.emit(KernelEvent::PartStopped {
            part: part.name.clone(),
            reason: StopReason::Elapsed,
        });
    }

    fn fault(&self, part: &Part, source: DriverError) -> ActuationError {
        warn!(part = %part.name, error = %source, "Driver fault");
        self.inner.events.emit(KernelEvent::DriverFault {
            part: part.name.clone(),
        });
        ActuationError::Driver {
            part: part.name.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverCall, RecordingDriver};
    use crate::parts::{Capability, LineBinding};

    fn back_only() -> Arc<PartRegistry> {
        let back = Part {
            name: "back".to_string(),
            capability: Capability::BOTH,
            duration: Duration::from_millis(2000),
            cool_down: Duration::ZERO,
            binding: LineBinding { up: 20, down: 16 },
        };
        Arc::new(PartRegistry::new(vec![back]).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_on_deadline_tick_completes_old_motion() {
        let driver = Arc::new(RecordingDriver::new());
        let (events, mut rx) = EventSink::channel();
        let controller = ActuationController::new(back_only(), driver.clone(), events);

        controller
            .move_part(ActuationRequest::direct("back", Direction::Raise))
            .await
            .unwrap();
        // Put the motion on its deadline tick before its timer has run.
        {
            let mut slot = controller.inner.slots["back"].lock().await;
            if let PartState::Actuating(actuation) = &mut slot.state {
                actuation.deadline = Instant::now();
            }
        }

        let movement = controller
            .move_part(ActuationRequest::direct("back", Direction::Lower))
            .await
            .unwrap();
        assert_eq!(movement.outcome, MoveOutcome::Accepted);

        let mut reasons = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let KernelEvent::PartStopped { reason, .. } = event {
                reasons.push(reason);
            }
        }
        assert_eq!(reasons, vec![StopReason::Elapsed]);
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::Drive("back".into(), Direction::Raise),
                DriverCall::Stop("back".into()),
                DriverCall::Drive("back".into(), Direction::Lower),
            ]
        );
    }
}
