use tracing::{debug, info};

use super::types::Intent;
use crate::kernel::{
    ActuationController, ActuationError, ActuationRequest, RoutineEngine, StatusReporter,
};
use crate::outputs::phrases;
use crate::parts::Direction;

/// Translates intents into kernel calls and kernel outcomes into speech.
/// Holds no state of its own; every path yields a response.
#[derive(Clone)]
pub struct IntentDispatcher {
    controller: ActuationController,
    engine: RoutineEngine,
    status: StatusReporter,
}

impl IntentDispatcher {
    pub fn new(controller: ActuationController, engine: RoutineEngine) -> Self {
        let status = StatusReporter::new(controller.clone(), engine.clone());
        Self {
            controller,
            engine,
            status,
        }
    }

    pub async fn handle(&self, intent: &Intent) -> String {
        match intent {
            Intent::GetStatus => {
                let report = self.status.report().await;
                debug!(
                    routines = report.routines.len(),
                    moving = report.moving.len(),
                    "Status requested"
                );
                phrases::status(&report)
            }
            Intent::MovePart { direction, part } => self.move_part(part, *direction).await,
            Intent::StartRoutine { name } => {
                let outcome = self.engine.start(name).await;
                let name = self.routine_name(name);
                info!(routine = %name, ?outcome, "Start routine intent");
                phrases::routine_started(name, outcome)
            }
            Intent::StopRoutine { name } => {
                let outcome = self.engine.stop(name).await;
                let name = self.routine_name(name);
                info!(routine = %name, ?outcome, "Stop routine intent");
                phrases::routine_stopped(name, outcome)
            }
            Intent::Unrecognized { reason } => {
                debug!(%reason, "Asking for clarification");
                phrases::clarification()
            }
        }
    }

    /// Parse and handle a raw payload from the speech platform.
    pub async fn handle_json(&self, payload: &str) -> String {
        self.handle(&Intent::from_json_str(payload)).await
    }

    /// Canonical routine name when known, the spoken text otherwise.
    fn routine_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.engine
            .routines()
            .lookup(name)
            .map_or(name.trim(), |def| def.name.as_str())
    }

    async fn move_part(&self, part: &str, direction: Direction) -> String {
        match self.controller.move_part(ActuationRequest::direct(part, direction)).await {
            Ok(movement) => {
                let name = self
                    .controller
                    .parts()
                    .lookup(part)
                    .map_or(part, |found| found.name.as_str());
                phrases::moving(name, direction, movement.outcome)
            }
            Err(ActuationError::UnknownPart(name)) => phrases::unknown_part(&name),
            Err(ActuationError::UnsupportedDirection { part, direction }) => {
                phrases::unsupported_direction(&part, direction)
            }
            Err(ActuationError::Driver { part, .. }) => phrases::driver_failure(&part),
        }
    }
}
