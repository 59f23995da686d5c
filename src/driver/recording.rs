use std::collections::HashSet;
use std::sync::Mutex;

use super::{ActuatorDriver, DriverError};
use crate::parts::{Direction, Part};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Drive(String, Direction),
    Stop(String),
}

/// Driver double that records every call, with optional fault injection.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    calls: Mutex<Vec<DriverCall>>,
    faulty: Mutex<HashSet<String>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Calls that touched one part, in order.
    pub fn calls_for(&self, part: &str) -> Vec<DriverCall> {
        self.calls()
            .into_iter()
            .filter(|call| match call {
                DriverCall::Drive(name, _) | DriverCall::Stop(name) => name == part,
            })
            .collect()
    }

    /// Make every subsequent `drive` of `part` fail.
    pub fn fail_drives(&self, part: &str) {
        if let Ok(mut faulty) = self.faulty.lock() {
            faulty.insert(part.to_string());
        }
    }

    fn record(&self, call: DriverCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn is_faulty(&self, part: &str) -> bool {
        self.faulty.lock().map(|faulty| faulty.contains(part)).unwrap_or(false)
    }
}

impl ActuatorDriver for RecordingDriver {
    fn drive(&self, part: &Part, direction: Direction) -> Result<(), DriverError> {
        self.record(DriverCall::Drive(part.name.clone(), direction));
        if self.is_faulty(&part.name) {
            return Err(DriverError::Fault {
                part: part.name.clone(),
                message: "injected".to_string(),
            });
        }
        Ok(())
    }

    fn stop(&self, part: &Part) -> Result<(), DriverError> {
        self.record(DriverCall::Stop(part.name.clone()));
        Ok(())
    }
}
