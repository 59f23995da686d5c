pub mod actuation;
pub mod event;
pub mod routine;
pub mod state;
pub mod status;
pub mod telemetry;

pub use actuation::{ActuationController, ActuationError, MoveOutcome, Movement};
pub use event::{EventSink, FinishReason, KernelEvent, StopReason};
pub use routine::{Lifecycle, RoutineEngine, RoutineStatus, StartOutcome, StopOutcome};
pub use state::{Actuation, ActuationContext, ActuationRequest, Epoch, PartState};
pub use status::{PartActivity, StatusReport, StatusReporter};
