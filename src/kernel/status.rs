use super::actuation::ActuationController;
use super::routine::{RoutineEngine, RoutineStatus};
use super::state::ActuationContext;
use crate::parts::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartActivity {
    pub part: String,
    pub direction: Direction,
    pub context: ActuationContext,
}

/// Point-in-time answer to "what is running".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub routines: Vec<RoutineStatus>,
    pub moving: Vec<PartActivity>,
}

#[derive(Clone)]
pub struct StatusReporter {
    controller: ActuationController,
    engine: RoutineEngine,
}

impl StatusReporter {
    pub fn new(controller: ActuationController, engine: RoutineEngine) -> Self {
        Self { controller, engine }
    }

    pub async fn report(&self) -> StatusReport {
        let routines = self.engine.running().await;
        let moving = self
            .controller
            .active()
            .await
            .into_iter()
            .map(|(part, actuation)| PartActivity {
                part,
                direction: actuation.direction,
                context: actuation.context,
            })
            .collect();
        StatusReport { routines, moving }
    }
}
