#![deny(warnings)]
#![allow(missing_docs)]
//! Core functionality for the Lapse instrumentation timer.
//!
//! This crate provides a lightweight, hierarchical timer for attributing
//! elapsed time to named operations within a single program run. A timer
//! records durations either explicitly (mark a point, later measure from
//! it) or implicitly (measure since creation or since the previous
//! measurement), and owns named child timers so sub-operations report
//! under their parent in one nested snapshot.

/// Monotonic time sources and the clock injection seam
pub mod clock;
/// Hierarchical timer recording marks, measures, and child contexts
pub mod timer;

// Re-export critical types for embedders
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use lapse_types::{ChildMeasures, Measure, NestedMeasures};
pub use timer::{ScopeGuard, Timer};
