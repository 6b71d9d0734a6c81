//! `gw-traffic` — mutable per-junction vehicle counts.
//!
//! [`CongestionModel`] is the live cost input for the route solver (via the
//! [`CongestionSource`][gw_spatial::CongestionSource] trait) and the state
//! the runtime decrements as agents pass junctions.  The [`seed`] module is
//! the background arrival simulation that fills the model before a run; it
//! shares the model but is not part of routing itself.

pub mod congestion;
pub mod seed;


pub use congestion::CongestionModel;
pub use seed::{SeedConfig, distribute_fleet, warm_up};
