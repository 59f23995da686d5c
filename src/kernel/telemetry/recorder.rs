use std::collections::VecDeque;

use super::metrics::{compute_snapshot, TelemetrySnapshot};
use crate::kernel::event::KernelEvent;

const MAX_EVENTS: usize = 10_000;

/// Bounded in-memory window of recent kernel events.
#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<KernelEvent>,
    capacity: usize,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::with_capacity(MAX_EVENTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity.min(MAX_EVENTS)),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, event: KernelEvent) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.buffer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}
