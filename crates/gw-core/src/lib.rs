//! `gw-core` — foundational types for the greenwave preemption pipeline.
//!
//! This crate is a dependency of every other `gw-*` crate.  It intentionally
//! has no `gw-*` dependencies and minimal external ones (only `rand`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module   | Contents                                       |
//! |----------|------------------------------------------------|
//! | [`ids`]  | `JunctionId`, `AgentId`, `DestinationId`       |
//! | [`grid`] | `GridPoint`, Euclidean distance                |
//! | [`time`] | `Tick`, `RunClock`, `RunConfig`                |
//! | [`rng`]  | `SimRng` (seeded, reproducible)                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod grid;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use grid::GridPoint;
pub use ids::{AgentId, DestinationId, JunctionId};
pub use rng::SimRng;
pub use time::{RunClock, RunConfig, Tick};
