pub mod config;
pub mod driver;
pub mod error;
pub mod intent;
pub mod kernel;
pub mod outputs;
pub mod parts;
pub mod routines;

// Re-export the pieces a host wires together
pub use config::SandmanConfig;
pub use intent::{Intent, IntentDispatcher};
pub use kernel::{ActuationController, EventSink, RoutineEngine};
