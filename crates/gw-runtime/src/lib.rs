//! `gw-runtime` — the multi-agent tick loop.
//!
//! # Tick phases
//!
//! ```text
//! for tick in 1..=config.max_ticks:
//!   ① Replan    — every R ticks, recompute each active agent's route from
//!                 its current junction to its fixed target; a failed solve
//!                 keeps the old route.  Tier profiles move to the new route.
//!   ② Advance   — each non-done agent's cursor moves one index (or the
//!                 agent is marked done at the route end).
//!   ③ Record    — one packed frame word per agent per tick.
//!   ④ Congestion — decrement the count at each junction just left.
//!   ⑤ Signals   — advance every state machine, then install post-pass
//!                 swap overrides for the junctions passed this tick.
//! ```
//!
//! Agents are processed in ascending id order in every phase, so shared
//! congestion and signal mutations are reproducible given the same inputs.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                            |
//! |------------|---------------------------------------------------|
//! | `parallel` | Runs the replan searches on Rayon's thread pool.  |

pub mod agent;
pub mod observer;
pub mod session;
pub mod summary;

mod error;

#[cfg(test)]
mod tests;

pub use agent::Agent;
pub use error::{RunError, RunResult};
pub use observer::{NoopObserver, RunObserver};
pub use session::{Session, SessionBuilder};
pub use summary::{AgentReport, RunSummary};
