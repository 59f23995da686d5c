use std::collections::VecDeque;

use crate::kernel::event::{FinishReason, KernelEvent, StopReason};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub actuation_stats: ActuationStats,
    pub routine_stats: RoutineStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActuationStats {
    pub started: u64,
    pub direct: u64,
    pub elapsed: u64,
    pub preempted: u64,
    pub requested_stops: u64,
    pub driver_faults: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutineStats {
    pub started: u64,
    pub completed: u64,
    pub stopped: u64,
    pub faulted: u64,
    pub superseded_steps: u64,
    /// Fraction of finished runs that ran to completion.
    pub completion_ratio: f64,
}

pub fn compute_snapshot(events: &VecDeque<KernelEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            KernelEvent::PartStarted { context, .. } => {
                snap.actuation_stats.started += 1;
                if context.is_direct() {
                    snap.actuation_stats.direct += 1;
                }
            }
            KernelEvent::PartStopped { reason, .. } => match reason {
                StopReason::Elapsed => snap.actuation_stats.elapsed += 1,
                StopReason::Preempted => snap.actuation_stats.preempted += 1,
                StopReason::Requested => snap.actuation_stats.requested_stops += 1,
            },
            KernelEvent::DriverFault { .. } => snap.actuation_stats.driver_faults += 1,
            KernelEvent::RoutineStarted { .. } => snap.routine_stats.started += 1,
            KernelEvent::RoutineStepSuperseded { .. } => snap.routine_stats.superseded_steps += 1,
            KernelEvent::RoutineFinished { reason, .. } => match reason {
                FinishReason::Completed => snap.routine_stats.completed += 1,
                FinishReason::Stopped => snap.routine_stats.stopped += 1,
                FinishReason::Faulted => snap.routine_stats.faulted += 1,
            },
        }
    }

    let finished =
        snap.routine_stats.completed + snap.routine_stats.stopped + snap.routine_stats.faulted;
    if finished > 0 {
        snap.routine_stats.completion_ratio = snap.routine_stats.completed as f64 / finished as f64;
    }

    snap
}
