//! Run observer trait for progress reporting.

use gw_core::Tick;

use crate::RunSummary;

/// Callbacks invoked by [`Session::run`][crate::Session::run] at tick
/// boundaries.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait RunObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick; `active` is the number of agents
    /// still en route.
    fn on_tick_end(&mut self, _tick: Tick, _active: usize) {}

    /// Called once after the loop ends, with the completed summary.
    fn on_run_end(&mut self, _summary: &RunSummary) {}
}

/// A [`RunObserver`] that does nothing.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}
