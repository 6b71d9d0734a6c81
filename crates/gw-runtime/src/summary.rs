//! The typed run summary.
//!
//! Earlier revisions of this pipeline recovered route state between stages by
//! re-parsing a free-text log.  The summary is now a typed record produced by
//! the session; its `Display` rendering is diagnostic output only and is
//! never parsed by any component.

use std::fmt;

use gw_core::{AgentId, JunctionId};

/// Per-agent route artifacts for the run report.
#[derive(Debug, Clone)]
pub struct AgentReport {
    pub agent: AgentId,
    pub spawn: JunctionId,
    pub target: JunctionId,
    /// Length of the agent's final route (post-replan).
    pub route_len: usize,
    /// Cost of the agent's final route under the solver's weights.
    pub route_cost: f64,
    /// Number of successful replans.
    pub replans: u32,
    pub completed: bool,
    /// Set when any of the agent's routes was too short for the tier minima.
    pub degenerate_tier: bool,
}

/// The session's result record.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Ticks actually simulated.
    pub ticks: u64,
    /// `false` when the tick budget ran out with agents still active.
    pub complete: bool,
    pub agents: Vec<AgentReport>,
}

impl RunSummary {
    /// The budget ran out before every agent arrived.
    pub fn incomplete(&self) -> bool {
        !self.complete
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks={}", self.ticks)?;
        writeln!(f, "complete={}", self.complete)?;
        for report in &self.agents {
            let i = report.agent.0;
            writeln!(f, "agent_{i}_spawn={}", report.spawn.0)?;
            writeln!(f, "agent_{i}_target={}", report.target.0)?;
            writeln!(f, "agent_{i}_route_len={}", report.route_len)?;
            writeln!(f, "agent_{i}_route_cost={:.3}", report.route_cost)?;
            writeln!(f, "agent_{i}_replans={}", report.replans)?;
            writeln!(f, "agent_{i}_done={}", report.completed)?;
            if report.degenerate_tier {
                writeln!(f, "agent_{i}_degenerate_tier=true")?;
            }
        }
        Ok(())
    }
}
