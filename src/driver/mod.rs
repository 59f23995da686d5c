//! Actuator driver seam.
//!
//! The kernel only ever calls `drive` and `stop`; both are synchronous and
//! fire-and-forget. Anything that touches real hardware lives behind
//! [`ActuatorDriver`].

pub mod gpio;
pub mod recording;

use thiserror::Error;

use crate::parts::{Direction, Part};

pub use gpio::SimulatedGpio;
pub use recording::{DriverCall, RecordingDriver};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("GPIO line {line} is not acquired")]
    LineUnavailable { line: u32 },

    #[error("GPIO line {line} is already acquired")]
    LineInUse { line: u32 },

    #[error("hardware fault on '{part}': {message}")]
    Fault { part: String, message: String },
}

pub trait ActuatorDriver: Send + Sync {
    /// Start moving `part` in `direction`. Must leave the opposite direction inactive.
    fn drive(&self, part: &Part, direction: Direction) -> Result<(), DriverError>;

    /// Stop all motion of `part`.
    fn stop(&self, part: &Part) -> Result<(), DriverError>;
}
