use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use super::{ActuatorDriver, DriverError};
use crate::parts::{Direction, Part, PartRegistry};

/// Line-level driver that tracks output levels without a GPIO chip.
///
/// Lines are acquired once at construction from the part bindings, so the
/// set is fixed and each line's level is an independent atomic. Used off
/// device and as the default driver of the binary.
#[derive(Debug)]
pub struct SimulatedGpio {
    lines: HashMap<u32, AtomicBool>,
}

impl SimulatedGpio {
    pub fn new(parts: &PartRegistry) -> Result<Self, DriverError> {
        let mut lines = HashMap::new();
        for part in parts.iter() {
            for line in [part.binding.up, part.binding.down] {
                if lines.insert(line, AtomicBool::new(false)).is_some() {
                    return Err(DriverError::LineInUse { line });
                }
            }
        }
        info!(lines = lines.len(), "Acquired output lines");
        Ok(Self { lines })
    }

    /// `Some(true)` when the line is driven, `None` if it was never acquired.
    pub fn is_active(&self, line: u32) -> Option<bool> {
        self.lines.get(&line).map(|level| level.load(Ordering::SeqCst))
    }

    fn set_line(&self, line: u32, active: bool) -> Result<(), DriverError> {
        let level = self
            .lines
            .get(&line)
            .ok_or(DriverError::LineUnavailable { line })?;
        level.store(active, Ordering::SeqCst);
        debug!(line, active, "Set line level");
        Ok(())
    }
}

impl ActuatorDriver for SimulatedGpio {
    fn drive(&self, part: &Part, direction: Direction) -> Result<(), DriverError> {
        // Never energize both directions at once.
        self.set_line(part.binding.line_for(direction.opposite()), false)?;
        self.set_line(part.binding.line_for(direction), true)
    }

    fn stop(&self, part: &Part) -> Result<(), DriverError> {
        self.set_line(part.binding.up, false)?;
        self.set_line(part.binding.down, false)
    }
}
