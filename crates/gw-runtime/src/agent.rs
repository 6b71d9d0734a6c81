//! Per-agent runtime state.

use gw_core::{AgentId, JunctionId};
use gw_spatial::Route;

/// One priority agent: its route, a cursor into it, and its fixed target.
///
/// The cursor advances at most one index per tick.  Replanning replaces the
/// route wholesale and resets the cursor; the target never changes after
/// spawn.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub route: Route,
    /// Index of the junction the agent currently occupies.
    pub cursor: usize,
    /// The destination junction, fixed for the agent's lifetime.
    pub target: JunctionId,
    /// Terminal once the cursor has reached the last route index.
    pub done: bool,
}

impl Agent {
    pub fn new(id: AgentId, route: Route, target: JunctionId) -> Self {
        Self { id, route, cursor: 0, target, done: false }
    }

    /// The junction under the cursor.
    #[inline]
    pub fn current_junction(&self) -> JunctionId {
        self.route.junctions[self.cursor]
    }

    /// `true` when the cursor sits on the route's last index.
    #[inline]
    pub fn at_route_end(&self) -> bool {
        self.cursor + 1 >= self.route.len()
    }
}
