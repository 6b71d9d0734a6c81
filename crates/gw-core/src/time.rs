//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter; one tick is one step of
//! every agent, one decrement of every signal timer, and at most one cursor
//! advance per agent.  There is no wall-clock mapping — the record formats at
//! the boundary are frame-indexed, not timestamped.
//!
//! Ticks count from 1 inside a run: with replan interval `R` the first replan
//! fires at tick `R`, never at spawn time.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// `true` when this tick is a multiple of `interval` (replan cadence).
    #[inline]
    pub fn is_multiple_of(self, interval: u64) -> bool {
        interval > 0 && self.0 % interval == 0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── RunClock ──────────────────────────────────────────────────────────────────

/// The session's tick counter.  Cheap to copy, holds no heap data.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunClock {
    /// The current tick — advanced by [`RunClock::advance`] each iteration.
    pub current_tick: Tick,
}

impl RunClock {
    pub fn new() -> Self {
        Self { current_tick: Tick::ZERO }
    }

    /// Advance the clock by one tick and return the new tick.
    #[inline]
    pub fn advance(&mut self) -> Tick {
        self.current_tick = Tick(self.current_tick.0 + 1);
        self.current_tick
    }
}

// ── RunConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration for one simulation session.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Replan every N ticks.  Must be ≥ 1.
    pub replan_interval_ticks: u64,

    /// Tick budget; exhausting it ends the run as incomplete.
    pub max_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
}

impl RunConfig {
    /// The tick at which the budget is exhausted (inclusive upper bound).
    #[inline]
    pub fn last_tick(&self) -> Tick {
        Tick(self.max_ticks)
    }

    /// Construct a fresh clock for this run.
    pub fn make_clock(&self) -> RunClock {
        RunClock::new()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            replan_interval_ticks: 5,
            max_ticks: 1_000,
            seed: 0,
        }
    }
}
