//! Hierarchical timer for attributing elapsed time to named operations.
//!
//! A [`Timer`] wraps a monotonic [`Clock`] with three pieces of state: open
//! marks awaiting a measurement, an ordered log of completed measures, and
//! named child timers. Measuring a name consumes its mark when one is open
//! and otherwise falls back to the implicit reference — the timer's
//! creation instant or the end of the previous measurement, whichever is
//! more recent.

use std::collections::HashMap;
use std::time::Duration;

use lapse_types::{Measure, NestedMeasures};
use tracing::debug;

use crate::clock::{Clock, MonotonicClock};

/// Convert a clock-reading difference to fractional milliseconds.
fn duration_ms(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1e6
}

/// Hierarchical timer recording named durations against a monotonic clock.
///
/// All mutation takes `&mut self`; a timer and its descendants are meant to
/// be confined to one logical operation at a time. Sibling subtrees are
/// independent and may be driven separately once handed out.
#[derive(Debug)]
pub struct Timer<C: Clock = MonotonicClock> {
    clock: C,
    /// Reference reading for the next measurement of an unmarked name.
    start: Duration,
    /// Open marks: name to the reading taken when the mark was set.
    marks: HashMap<String, Duration>,
    /// Completed measurements in recording order.
    measures: Vec<Measure>,
    /// Child timers in creation order.
    children: Vec<(String, Timer<C>)>,
}

impl Timer<MonotonicClock> {
    /// Create a timer against a fresh ambient monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for Timer<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Timer<C> {
    /// Create a timer that reads time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        let start = clock.now();
        Self { clock, start, marks: HashMap::new(), measures: Vec::new(), children: Vec::new() }
    }

    /// Create a child timer registered under `name` and return it.
    ///
    /// The child shares the parent's clock and starts at the current
    /// reading. When `name` is already taken, the new child is registered
    /// under `"{name}-{n}"` where `n` is the number of children before
    /// insertion, so a repeated label (e.g. in a loop) never overwrites an
    /// earlier sub-timer. The returned reference is always the newly
    /// created child; the earlier child keeps its original key.
    pub fn with_context(&mut self, name: &str) -> &mut Timer<C>
    where
        C: Clone,
    {
        let key = if self.children.iter().any(|(existing, _)| existing == name) {
            format!("{name}-{}", self.children.len())
        } else {
            name.to_string()
        };

        debug!(context = %key, requested = %name, "Opened child context");

        let index = self.children.len();
        self.children.push((key, Timer::with_clock(self.clock.clone())));
        &mut self.children[index].1
    }

    /// Record the current reading against `name`.
    ///
    /// A re-mark silently replaces the previous open mark of the same name
    /// without emitting a measurement for it.
    pub fn mark(&mut self, name: &str) {
        let at = self.clock.now();
        self.marks.insert(name.to_string(), at);
    }

    /// Record the elapsed time for `name` into the measure log.
    ///
    /// Uses and consumes the open mark of the same name when one exists;
    /// otherwise measures from the implicit reference. Either way the
    /// implicit reference is reset to the current reading, so the next
    /// unmarked measurement covers the span from this call.
    pub fn measure(&mut self, name: &str) {
        let now = self.clock.now();
        let (reference, marked) = match self.marks.remove(name) {
            Some(at) => (at, true),
            None => (self.start, false),
        };
        let duration = duration_ms(now.saturating_sub(reference));
        self.start = now;

        debug!(name = %name, duration_ms = duration, marked = marked, "Recorded measure");

        self.measures.push(Measure::new(name, duration));
    }

    /// Mark `name`, run `f`, measure `name`, and return `f`'s value.
    pub fn time<T, F>(&mut self, name: &str, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.mark(name);
        let result = f();
        self.measure(name);
        result
    }

    /// Mark `name` and return a guard that measures it when dropped.
    ///
    /// Records the measurement even when the instrumented scope exits
    /// early.
    pub fn scope(&mut self, name: &str) -> ScopeGuard<'_, C> {
        self.mark(name);
        ScopeGuard { timer: self, name: name.to_string() }
    }

    /// Close out all open state, recursively.
    ///
    /// A timer that recorded nothing at all — zero measures and zero open
    /// marks — gets one implicit `"total"` measurement covering its whole
    /// lifetime. Every remaining open mark is then measured so none is
    /// dropped from the report, and every child is finalized in creation
    /// order. Intended to be called once per timer lifetime.
    pub fn finalize(&mut self) {
        if self.measures.is_empty() && self.marks.is_empty() {
            debug!("Nothing measured, recording total elapsed time");
            self.measure("total");
        }

        let open: Vec<String> = self.marks.keys().cloned().collect();
        for name in open {
            self.measure(&name);
        }

        for (_, child) in &mut self.children {
            child.finalize();
        }
    }

    /// Discard all marks, measures, and children and restart the implicit
    /// reference at the current reading.
    pub fn reset(&mut self) {
        self.start = self.clock.now();
        self.marks.clear();
        self.measures.clear();
        self.children.clear();
    }

    /// Produce the nested, read-only export of this timer and its
    /// descendants.
    ///
    /// The snapshot may be taken at any point, but is only complete once
    /// the whole tree has been finalized.
    pub fn snapshot(&self) -> NestedMeasures {
        let children = if self.children.is_empty() {
            None
        } else {
            Some(
                self.children
                    .iter()
                    .map(|(name, child)| (name.clone(), child.snapshot()))
                    .collect(),
            )
        };
        NestedMeasures { measures: self.measures.clone(), children }
    }

    /// Export the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    /// Completed measurements in recording order.
    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    /// Number of marks still awaiting a measurement.
    pub fn open_marks(&self) -> usize {
        self.marks.len()
    }

    /// Whether `name` currently has an open mark.
    pub fn has_open_mark(&self, name: &str) -> bool {
        self.marks.contains_key(name)
    }

    /// Look up the first child registered under `name`.
    pub fn child(&self, name: &str) -> Option<&Timer<C>> {
        self.children.iter().find(|(key, _)| key == name).map(|(_, child)| child)
    }

    /// Iterate child timers in creation order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Timer<C>)> {
        self.children.iter().map(|(name, child)| (name.as_str(), child))
    }

    /// Whether this timer has no child contexts.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Guard returned by [`Timer::scope`]; measures its name on drop.
pub struct ScopeGuard<'a, C: Clock> {
    timer: &'a mut Timer<C>,
    name: String,
}

impl<C: Clock> Drop for ScopeGuard<'_, C> {
    fn drop(&mut self) {
        self.timer.measure(&self.name);
    }
}

/// Measure a block of code against a timer under the given name.
#[macro_export]
macro_rules! measure_block {
    ($timer:expr, $name:expr, $code:block) => {
        $timer.time($name, || $code)
    };
}
