//! Kernel telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a READ-ONLY side-effect layer fed from the kernel event
//! channel. Nothing on the request path may read it back.
//!
//! # PRIVACY INVARIANT
//! Only part/routine names, ids and counts are recorded. Nothing is persisted.

pub mod metrics;
pub mod recorder;

pub use metrics::*;
pub use recorder::*;
