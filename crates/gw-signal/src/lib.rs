//! `gw-signal` — per-junction traffic-signal state machines plus the tiered
//! preemption policy.
//!
//! # Model
//!
//! Every junction runs a free-running three-phase cycle
//! (RED → GREEN → YELLOW → RED) driven only by its countdown timer.
//! Preemption never adds transitions: it is an *overlay*.  An active
//! [`PreemptionOverride`] replaces the effective phase/timer observed by
//! consumers for a bounded number of ticks while the underlying cycle is
//! frozen; on expiry the cycle resumes where it left off.
//!
//! Only the priority agent's approach direction is modeled as a state
//! machine; the cross-street ("others") timings exist for reported/exported
//! values only.
//!
//! | Module         | Contents                                        |
//! |----------------|-------------------------------------------------|
//! | [`phase`]      | `Phase`, `SignalState`                          |
//! | [`cycle`]      | `CycleConfig`, `TimingProfile`                  |
//! | [`tier`]       | `Tier`, `TierPolicy`, `TierPartition`           |
//! | [`controller`] | `SignalController`, `PreemptionOverride`        |

pub mod controller;
pub mod cycle;
pub mod phase;
pub mod tier;

#[cfg(test)]
mod tests;

pub use controller::{OverrideKind, PreemptionOverride, SignalController};
pub use cycle::{CycleConfig, TimingProfile};
pub use phase::{Phase, SignalState};
pub use tier::{Tier, TierPartition, TierPolicy};
