//! Routine execution.
//!
//! Each routine name owns one slot holding at most one running instance.
//! A run is an independent task that walks the steps in order and checks its
//! cancellation token between steps. Stopping never cuts a motion short: the
//! step in flight finishes, and the part's own timer stops the hardware.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use super::actuation::{ActuationController, MoveOutcome};
use super::event::{EventSink, FinishReason, KernelEvent};
use super::state::{ActuationContext, ActuationRequest};
use crate::routines::{RoutineDefinition, RoutineRegistry, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    NotRunning,
    Starting,
    Running,
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
    /// The previous run was stopped but its last step has not finished yet.
    StillStopping,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineStatus {
    pub name: String,
    pub instance: Uuid,
    pub lifecycle: Lifecycle,
    pub step: usize,
}

#[derive(Debug)]
struct RoutineInstance {
    id: Uuid,
    lifecycle: Lifecycle,
    step: usize,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct RoutineSlot {
    instance: Option<RoutineInstance>,
}

struct Inner {
    routines: Arc<RoutineRegistry>,
    slots: HashMap<String, Mutex<RoutineSlot>>,
    controller: ActuationController,
    events: EventSink,
}

#[derive(Clone)]
pub struct RoutineEngine {
    inner: Arc<Inner>,
}

impl RoutineEngine {
    pub fn new(
        routines: Arc<RoutineRegistry>,
        controller: ActuationController,
        events: EventSink,
    ) -> Self {
        let slots = routines
            .names()
            .into_iter()
            .map(|name| (name, Mutex::new(RoutineSlot::default())))
            .collect();
        Self {
            inner: Arc::new(Inner {
                routines,
                slots,
                controller,
                events,
            }),
        }
    }

    pub fn routines(&self) -> &RoutineRegistry {
        &self.inner.routines
    }

    fn resolve(&self, name: &str) -> Option<(&RoutineDefinition, &Mutex<RoutineSlot>)> {
        let def = self.inner.routines.lookup(name)?;
        let slot = self.inner.slots.get(&def.name)?;
        Some((def, slot))
    }

    pub async fn start(&self, name: &str) -> StartOutcome {
        let Some((def, slot)) = self.resolve(name) else {
            return StartOutcome::NotFound;
        };

        let mut slot = slot.lock().await;
        if let Some(existing) = &slot.instance {
            return match existing.lifecycle {
                Lifecycle::Stopping => StartOutcome::StillStopping,
                _ => StartOutcome::AlreadyRunning,
            };
        }

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        slot.instance = Some(RoutineInstance {
            id,
            lifecycle: Lifecycle::Starting,
            step: 0,
            cancel: cancel.clone(),
        });

        info!(routine = %def.name, instance = %id, "Routine starting");
        self.inner.events.emit(KernelEvent::RoutineStarted {
            name: def.name.clone(),
            instance: id,
        });

        let engine = self.clone();
        let def = def.clone();
        tokio::spawn(async move { engine.run(def, id, cancel).await });

        StartOutcome::Started
    }

    /// Cooperative stop: no further steps are scheduled, the step in flight finishes.
    pub async fn stop(&self, name: &str) -> StopOutcome {
        let Some((def, slot)) = self.resolve(name) else {
            return StopOutcome::NotFound;
        };

        let mut slot = slot.lock().await;
        let Some(instance) = slot.instance.as_mut() else {
            return StopOutcome::NotRunning;
        };
        if instance.lifecycle != Lifecycle::Stopping {
            info!(
                routine = %def.name,
                instance = %instance.id,
                step = instance.step,
                "Routine stopping"
            );
            instance.lifecycle = Lifecycle::Stopping;
            instance.cancel.cancel();
        }
        StopOutcome::Stopped
    }

    pub async fn stop_all(&self) {
        for name in self.inner.routines.names() {
            self.stop(&name).await;
        }
    }

    /// `None` for unknown routines.
    pub async fn lifecycle(&self, name: &str) -> Option<Lifecycle> {
        let (_, slot) = self.resolve(name)?;
        let slot = slot.lock().await;
        Some(
            slot.instance
                .as_ref()
                .map_or(Lifecycle::NotRunning, |instance| instance.lifecycle),
        )
    }

    /// Every routine that is not NotRunning, sorted by name.
    pub async fn running(&self) -> Vec<RoutineStatus> {
        let mut running = Vec::new();
        for name in self.inner.routines.names() {
            let Some(slot) = self.inner.slots.get(&name) else {
                continue;
            };
            if let Some(instance) = &slot.lock().await.instance {
                running.push(RoutineStatus {
                    name,
                    instance: instance.id,
                    lifecycle: instance.lifecycle,
                    step: instance.step,
                });
            }
        }
        running
    }

    async fn run(self, def: RoutineDefinition, id: Uuid, cancel: CancellationToken) {
        self.update(&def.name, id, |instance| {
            if instance.lifecycle == Lifecycle::Starting {
                instance.lifecycle = Lifecycle::Running;
            }
        })
        .await;

        let reason = self.execute(&def, id, &cancel).await;

        let Some(slot) = self.inner.slots.get(&def.name) else {
            return;
        };
        let mut slot = slot.lock().await;
        if slot.instance.as_ref().is_some_and(|instance| instance.id == id) {
            slot.instance = None;
        }
        drop(slot);

        info!(routine = %def.name, instance = %id, ?reason, "Routine finished");
        self.inner.events.emit(KernelEvent::RoutineFinished {
            name: def.name.clone(),
            instance: id,
            reason,
        });
    }

    async fn execute(
        &self,
        def: &RoutineDefinition,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> FinishReason {
        let context = ActuationContext::Routine {
            name: def.name.clone(),
            instance: id,
        };

        loop {
            let mut waited = false;

            for (index, step) in def.steps.iter().enumerate() {
                // Checked under the slot lock so a stop that already returned
                // can never be followed by this step.
                let live = self.update(&def.name, id, |instance| instance.step = index).await;
                if !live || cancel.is_cancelled() {
                    return FinishReason::Stopped;
                }

                match step {
                    Step::Pause(duration) => {
                        tokio::select! {
                            _ = tokio::time::sleep(*duration) => {}
                            _ = cancel.cancelled() => return FinishReason::Stopped,
                        }
                        waited |= !duration.is_zero();
                    }
                    Step::Move {
                        part,
                        direction,
                        duration,
                        concurrent,
                    } => {
                        let request = ActuationRequest::new(part, *direction, context.clone())
                            .with_duration(*duration);
                        let wait = match self.inner.controller.move_part(request).await {
                            Ok(movement) => {
                                if movement.outcome == MoveOutcome::Superseded {
                                    warn!(
                                        routine = %def.name,
                                        step = index,
                                        part = %part,
                                        "Routine step interrupted another motion"
                                    );
                                    self.inner.events.emit(KernelEvent::RoutineStepSuperseded {
                                        name: def.name.clone(),
                                        step: index,
                                        part: part.clone(),
                                    });
                                }
                                movement.remaining
                            }
                            Err(err) => {
                                warn!(
                                    routine = %def.name,
                                    step = index,
                                    error = %err,
                                    "Routine step failed, continuing"
                                );
                                Duration::ZERO
                            }
                        };

                        // The step in flight always runs to completion.
                        if !concurrent && !wait.is_zero() {
                            tokio::time::sleep(wait).await;
                            waited = true;
                        }
                    }
                }
            }

            if !def.looping || cancel.is_cancelled() {
                break;
            }
            if !waited {
                warn!(routine = %def.name, "Looping routine made no progress, giving up");
                return FinishReason::Faulted;
            }
        }

        if cancel.is_cancelled() {
            FinishReason::Stopped
        } else {
            FinishReason::Completed
        }
    }

    /// Apply `apply` to this run's instance. Returns false once the run has
    /// been asked to stop (or is gone), in which case nothing is applied.
    async fn update(
        &self,
        name: &str,
        id: Uuid,
        apply: impl FnOnce(&mut RoutineInstance),
    ) -> bool {
        let Some(slot) = self.inner.slots.get(name) else {
            return false;
        };
        let mut slot = slot.lock().await;
        match slot.instance.as_mut().filter(|instance| instance.id == id) {
            Some(instance)
                if instance.lifecycle != Lifecycle::Stopping && !instance.cancel.is_cancelled() =>
            {
                apply(instance);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverCall, RecordingDriver};
    use crate::parts::{Capability, Direction, LineBinding, Part, PartRegistry};

    fn massage_engine() -> (RoutineEngine, Arc<RecordingDriver>) {
        let legs = Part {
            name: "legs".to_string(),
            capability: Capability::BOTH,
            duration: Duration::from_millis(1500),
            cool_down: Duration::ZERO,
            binding: LineBinding { up: 13, down: 26 },
        };
        let parts = Arc::new(PartRegistry::new(vec![legs]).unwrap());
        let massage = RoutineDefinition::new(
            "massage",
            vec![
                Step::movement("legs", Direction::Raise),
                Step::movement("legs", Direction::Lower),
            ],
        );
        let routines = Arc::new(RoutineRegistry::new(vec![massage], &parts).unwrap());
        let driver = Arc::new(RecordingDriver::new());
        let controller = ActuationController::new(parts, driver.clone(), EventSink::disabled());
        let engine = RoutineEngine::new(routines, controller, EventSink::disabled());
        (engine, driver)
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_while_next_step_waits_on_slot() {
        let (engine, driver) = massage_engine();
        engine.start("massage").await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        let slot = engine.inner.slots.get("massage").unwrap();
        let mut guard = slot.lock().await;
        // The raise ends at 1500 ms and the run then blocks on this lock.
        tokio::time::sleep(Duration::from_millis(1600)).await;
        let instance = guard.instance.as_mut().unwrap();
        instance.lifecycle = Lifecycle::Stopping;
        instance.cancel.cancel();
        drop(guard);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(engine.lifecycle("massage").await, Some(Lifecycle::NotRunning));
        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::Drive("legs".into(), Direction::Raise),
                DriverCall::Stop("legs".into()),
            ]
        );
    }
}
