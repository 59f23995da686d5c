#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use sandman::driver::RecordingDriver;
use sandman::kernel::{ActuationController, EventSink, KernelEvent, RoutineEngine};
use sandman::parts::{Capability, LineBinding, Part, PartRegistry};
use sandman::routines::{RoutineDefinition, RoutineRegistry};
use sandman::IntentDispatcher;
use tokio::sync::mpsc::UnboundedReceiver;

pub fn part(name: &str, ms: u64, up: u32, down: u32) -> Part {
    Part {
        name: name.to_string(),
        capability: Capability::BOTH,
        duration: Duration::from_millis(ms),
        cool_down: Duration::ZERO,
        binding: LineBinding { up, down },
    }
}

/// back 2000 ms, legs 1500 ms, elevation 4000 ms raise-only.
pub fn bed() -> Arc<PartRegistry> {
    let mut elevation = part("elevation", 4000, 5, 19);
    elevation.capability = Capability { raise: true, lower: false };
    let parts = vec![part("back", 2000, 20, 16), part("legs", 1500, 13, 26), elevation];
    Arc::new(PartRegistry::new(parts).unwrap())
}

pub struct Harness {
    pub driver: Arc<RecordingDriver>,
    pub controller: ActuationController,
    pub engine: RoutineEngine,
    pub dispatcher: IntentDispatcher,
    pub events: UnboundedReceiver<KernelEvent>,
}

pub fn harness(routines: Vec<RoutineDefinition>) -> Harness {
    harness_with(bed(), routines)
}

pub fn harness_with(parts: Arc<PartRegistry>, routines: Vec<RoutineDefinition>) -> Harness {
    let routines = Arc::new(RoutineRegistry::new(routines, &parts).unwrap());
    let driver = Arc::new(RecordingDriver::new());
    let (sink, events) = EventSink::channel();
    let controller = ActuationController::new(parts, driver.clone(), sink.clone());
    let engine = RoutineEngine::new(routines, controller.clone(), sink);
    let dispatcher = IntentDispatcher::new(controller.clone(), engine.clone());
    Harness {
        driver,
        controller,
        engine,
        dispatcher,
        events,
    }
}

pub fn drain(events: &mut UnboundedReceiver<KernelEvent>) -> Vec<KernelEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
