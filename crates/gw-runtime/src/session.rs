//! The `Session` struct, its builder, and the tick loop.

use log::{debug, warn};

use gw_core::{AgentId, JunctionId, RunClock, RunConfig, Tick};
use gw_records::words::{FRAME_FLAG_BLINK, pack_frame};
use gw_signal::{SignalController, TierPolicy};
use gw_spatial::{
    RoadGraph, Route, RouteQuery, RouteSolver, Solution, SpatialError, SpatialResult,
};
use gw_traffic::CongestionModel;

use crate::{Agent, AgentReport, RunError, RunObserver, RunResult, RunSummary};

/// Exported frames carry a blink flag toggling every half period.
const BLINK_HALF_PERIOD_TICKS: u64 = 10;

// ── SessionBuilder ────────────────────────────────────────────────────────────

/// Fluent builder for [`Session`].
///
/// # Required inputs
///
/// - the [`RoadGraph`], [`CongestionModel`], and [`SignalController`]
///   (their junction counts must agree),
/// - a [`RunConfig`],
/// - at least one spawn/target pair via [`agent`](Self::agent).
///
/// # Optional inputs
///
/// | Method          | Default                  |
/// |-----------------|--------------------------|
/// | `.solver(s)`    | `RouteSolver::default()` |
/// | `.tier_policy(p)` | `TierPolicy::default()` |
pub struct SessionBuilder {
    graph: RoadGraph,
    congestion: CongestionModel,
    signals: SignalController,
    config: RunConfig,
    solver: RouteSolver,
    policy: TierPolicy,
    pairs: Vec<(JunctionId, JunctionId)>,
}

impl SessionBuilder {
    pub fn new(
        graph: RoadGraph,
        congestion: CongestionModel,
        signals: SignalController,
        config: RunConfig,
    ) -> Self {
        Self {
            graph,
            congestion,
            signals,
            config,
            solver: RouteSolver::default(),
            policy: TierPolicy::default(),
            pairs: Vec::new(),
        }
    }

    pub fn solver(mut self, solver: RouteSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn tier_policy(mut self, policy: TierPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Add an agent spawning at `spawn` with fixed target `target`.
    /// Agent ids are assigned in call order.
    pub fn agent(mut self, spawn: JunctionId, target: JunctionId) -> Self {
        self.pairs.push((spawn, target));
        self
    }

    /// Validate inputs, solve every spawn route (falling back to the direct
    /// two-junction route when a target is unreachable), apply the initial
    /// tier preemption, and return a ready-to-run [`Session`].
    pub fn build(self) -> RunResult<Session> {
        let Self { graph, congestion, mut signals, config, solver, policy, pairs } = self;

        if config.replan_interval_ticks == 0 {
            return Err(RunError::Config("replan interval must be at least 1 tick".into()));
        }
        if pairs.is_empty() {
            return Err(RunError::Config("at least one agent is required".into()));
        }
        let junction_count = graph.junction_count();
        if congestion.junction_count() != junction_count {
            return Err(RunError::JunctionCountMismatch {
                expected: junction_count,
                got: congestion.junction_count(),
                what: "congestion model",
            });
        }
        if signals.junction_count() != junction_count {
            return Err(RunError::JunctionCountMismatch {
                expected: junction_count,
                got: signals.junction_count(),
                what: "signal controller",
            });
        }

        let mut agents = Vec::with_capacity(pairs.len());
        let mut spawns = Vec::with_capacity(pairs.len());
        let mut degenerate = vec![false; pairs.len()];

        for (i, (spawn, target)) in pairs.into_iter().enumerate() {
            let route = match solver.solve(&graph, &congestion, RouteQuery::CongestionWeightedPath {
                start: spawn,
                target,
            }) {
                Ok(solution) => solution.route,
                Err(SpatialError::Unreachable { from, to }) => {
                    debug!("no path {from} → {to}; spawning on the direct fallback route");
                    Route::direct(&graph, spawn, target)
                }
                Err(other) => return Err(other.into()),
            };

            let partition = signals.apply_tier(&route.junctions, &policy);
            degenerate[i] = partition.degenerate;
            agents.push(Agent::new(AgentId(i as u32), route, target));
            spawns.push(spawn);
        }

        let frames = vec![Vec::new(); agents.len()];
        let replans = vec![0u32; agents.len()];

        Ok(Session {
            clock: config.make_clock(),
            config,
            graph,
            congestion,
            signals,
            solver,
            policy,
            agents,
            spawns,
            frames,
            replans,
            degenerate,
        })
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// One simulation run: owns all mutable state (congestion counts, signal
/// machines, agents, recorded frames) for exactly the lifetime of the run.
/// The graph is owned too but never mutated after construction.
pub struct Session {
    config: RunConfig,
    clock: RunClock,
    graph: RoadGraph,
    congestion: CongestionModel,
    signals: SignalController,
    solver: RouteSolver,
    policy: TierPolicy,
    agents: Vec<Agent>,
    spawns: Vec<JunctionId>,
    /// Per-agent packed frame words, one per tick while the agent is active.
    frames: Vec<Vec<u32>>,
    replans: Vec<u32>,
    degenerate: Vec<bool>,
}

impl Session {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run until every agent is done or the tick budget is exhausted.
    ///
    /// Budget exhaustion is not an error: the summary reports
    /// `complete = false` and all partial frames remain available.
    pub fn run<O: RunObserver>(&mut self, observer: &mut O) -> RunSummary {
        let complete = loop {
            if self.agents.iter().all(|a| a.done) {
                break true;
            }
            if self.clock.current_tick.0 >= self.config.max_ticks {
                warn!(
                    "tick budget {} exhausted with {} agent(s) still active",
                    self.config.max_ticks,
                    self.agents.iter().filter(|a| !a.done).count()
                );
                break false;
            }

            let tick = self.clock.advance();
            observer.on_tick_start(tick);
            self.process_tick(tick);
            let active = self.agents.iter().filter(|a| !a.done).count();
            observer.on_tick_end(tick, active);
        };

        let summary = self.summary(complete);
        observer.on_run_end(&summary);
        summary
    }

    /// Process exactly `n` ticks from the current position, ignoring the
    /// budget and completion state.  Useful for tests and incremental
    /// stepping.
    pub fn run_ticks<O: RunObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            let tick = self.clock.advance();
            observer.on_tick_start(tick);
            self.process_tick(tick);
            let active = self.agents.iter().filter(|a| !a.done).count();
            observer.on_tick_end(tick, active);
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn congestion(&self) -> &CongestionModel {
        &self.congestion
    }

    /// Mutable congestion access for scenario injection (e.g. a mid-run
    /// spike) between ticks.
    pub fn congestion_mut(&mut self) -> &mut CongestionModel {
        &mut self.congestion
    }

    pub fn signals(&self) -> &SignalController {
        &self.signals
    }

    /// Recorded frame words for `agent`, one per tick it was active.
    pub fn frames(&self, agent: AgentId) -> &[u32] {
        &self.frames[agent.index()]
    }

    /// The session summary as of the current tick.
    pub fn summary(&self, complete: bool) -> RunSummary {
        let agents = self
            .agents
            .iter()
            .enumerate()
            .map(|(i, agent)| AgentReport {
                agent: agent.id,
                spawn: self.spawns[i],
                target: agent.target,
                route_len: agent.route.len(),
                route_cost: agent.route.cost,
                replans: self.replans[i],
                completed: agent.done,
                degenerate_tier: self.degenerate[i],
            })
            .collect();
        RunSummary {
            ticks: self.clock.current_tick.0,
            complete,
            agents,
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, tick: Tick) {
        // ── Phase 1: periodic replanning ──────────────────────────────────
        if tick.is_multiple_of(self.config.replan_interval_ticks) {
            self.replan_all(tick);
        }

        // ── Phases 2–3: advance cursors and record frames ─────────────────
        let blink = if (tick.0 / BLINK_HALF_PERIOD_TICKS) % 2 == 1 {
            FRAME_FLAG_BLINK
        } else {
            0
        };
        let mut passed: Vec<JunctionId> = Vec::new();
        for agent in &mut self.agents {
            if agent.done {
                continue;
            }
            if agent.at_route_end() {
                agent.done = true;
            } else {
                passed.push(agent.current_junction());
                agent.cursor += 1;
            }
            let position = self.graph.position(agent.current_junction());
            self.frames[agent.id.index()].push(pack_frame(position, agent.id.0 as u8, blink));
        }

        // ── Phase 4: congestion decrements at the junctions just left ─────
        for &junction in &passed {
            self.congestion.decrement_on_pass(junction);
        }

        // ── Phase 5: signal advancement, then the newly due swaps ─────────
        self.signals.advance_all();
        for &junction in &passed {
            self.signals.on_pass(junction);
        }
    }

    /// Recompute every active agent's route from its current junction to its
    /// fixed target.
    ///
    /// The solve phase only reads (graph + one congestion snapshot); with
    /// the `parallel` feature it fans out on Rayon.  The apply phase runs
    /// sequentially in ascending agent-id order either way, so shared
    /// signal-profile mutations are deterministic.
    fn replan_all(&mut self, tick: Tick) {
        let candidates: Vec<usize> = self
            .agents
            .iter()
            .enumerate()
            .filter(|(_, a)| !a.done && !a.at_route_end())
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return;
        }

        let solver = self.solver;
        let graph = &self.graph;
        let congestion = &self.congestion;
        let agents = &self.agents;

        let solve_one = |&i: &usize| -> (usize, SpatialResult<Solution>) {
            let agent = &agents[i];
            let result = solver.solve(graph, congestion, RouteQuery::CongestionWeightedPath {
                start: agent.current_junction(),
                target: agent.target,
            });
            (i, result)
        };

        #[cfg(not(feature = "parallel"))]
        let solutions: Vec<(usize, SpatialResult<Solution>)> =
            candidates.iter().map(solve_one).collect();

        #[cfg(feature = "parallel")]
        let solutions: Vec<(usize, SpatialResult<Solution>)> = {
            use rayon::prelude::*;
            candidates.par_iter().map(solve_one).collect()
        };

        // Apply in ascending agent order (candidates are already sorted).
        let agents = &mut self.agents;
        let signals = &mut self.signals;
        for (i, result) in solutions {
            match result {
                Ok(solution) => {
                    let agent = &mut agents[i];
                    signals.reset_route(&agent.route.junctions);
                    let partition = signals.apply_tier(&solution.route.junctions, &self.policy);
                    self.degenerate[i] |= partition.degenerate;
                    debug!(
                        "tick {tick}: agent {} replanned to {} junction(s)",
                        agent.id,
                        solution.route.len()
                    );
                    agent.route = solution.route;
                    agent.cursor = 0;
                    self.replans[i] += 1;
                }
                Err(err) => {
                    debug!("tick {tick}: replan failed for agent {i}: {err}; keeping route");
                }
            }
        }
    }
}
