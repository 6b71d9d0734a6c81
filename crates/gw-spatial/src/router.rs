//! Route queries and the Dijkstra core.
//!
//! # One solver, three modes
//!
//! Historically this pipeline grew several copies of the same weighted
//! search; they are collapsed here into one priority-queue core behind the
//! [`RouteQuery`] variant:
//!
//! - `PlainShortestPath` — pure Euclidean edge weights.
//! - `CongestionWeightedPath` — edge weights blended with a live per-junction
//!   congestion term.
//! - `WeightedDestinationSelection` — congestion-weighted search to every
//!   candidate destination, scored with a capacity/capability penalty.
//!
//! # Determinism
//!
//! The heap key is `(cost, junction index)`, so equal-cost frontier entries
//! pop in index order and two solves over identical inputs yield identical
//! routes.  The congestion normalization denominator is captured once at the
//! start of a solve — each solve reads one consistent congestion snapshot.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::{debug, warn};
use ordered_float::OrderedFloat;

use gw_core::{DestinationId, JunctionId};

use crate::{DestinationRegistry, RoadGraph, SpatialError, SpatialResult};

// ── Congestion input ──────────────────────────────────────────────────────────

/// Read-only view of per-junction congestion used as a live cost input.
///
/// Implemented by `gw-traffic`'s congestion model; the solver never mutates
/// it.  `max` must reflect the current counts (no stale caching) because it
/// normalizes the congestion term.
pub trait CongestionSource {
    fn count(&self, junction: JunctionId) -> u32;

    /// Maximum count over all junctions (0 when empty).
    fn max(&self) -> u32;
}

/// A [`CongestionSource`] reporting zero everywhere — turns the congestion-
/// weighted modes into plain distance searches.
pub struct ZeroCongestion;

impl CongestionSource for ZeroCongestion {
    fn count(&self, _junction: JunctionId) -> u32 {
        0
    }
    fn max(&self) -> u32 {
        0
    }
}

// ── Cost configuration ────────────────────────────────────────────────────────

/// Blend weights for the route cost function.
///
/// Edge (u,v) costs `alpha * weight + beta * ((c(u)+c(v))/2) / max(1, max_c)`;
/// destination selection adds
/// `gamma * ((1 - capacity/max_capacity) + (0 if capable else 1))`.
#[derive(Debug, Clone, Copy)]
pub struct CostWeights {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self { alpha: 1.0, beta: 2.0, gamma: 5.0 }
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: an ordered junction sequence from start to
/// target plus the accumulated cost.  Routes are immutable — replanning
/// replaces them wholesale, never edits them in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Junctions to visit in order, start first, target last.
    pub junctions: Vec<JunctionId>,
    /// Total cost under the weights the route was solved with.
    pub cost: f64,
}

impl Route {
    pub fn len(&self) -> usize {
        self.junctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.junctions.is_empty()
    }

    pub fn start(&self) -> Option<JunctionId> {
        self.junctions.first().copied()
    }

    pub fn target(&self) -> Option<JunctionId> {
        self.junctions.last().copied()
    }

    /// The two-junction fallback used when a search reports `Unreachable`:
    /// straight from start to target, costed at the crow-flies distance.
    pub fn direct(graph: &RoadGraph, start: JunctionId, target: JunctionId) -> Route {
        Route {
            junctions: vec![start, target],
            cost: graph.position(start).distance(graph.position(target)),
        }
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

/// The solver's query variant (see module docs).
pub enum RouteQuery<'a> {
    PlainShortestPath {
        start: JunctionId,
        target: JunctionId,
    },
    CongestionWeightedPath {
        start: JunctionId,
        target: JunctionId,
    },
    WeightedDestinationSelection {
        start: JunctionId,
        destinations: &'a DestinationRegistry,
    },
}

/// A solved query: the route, plus the chosen destination for
/// `WeightedDestinationSelection` queries.
#[derive(Debug, Clone)]
pub struct Solution {
    pub route: Route,
    pub destination: Option<DestinationId>,
}

// ── RouteSolver ───────────────────────────────────────────────────────────────

/// Stateless solver over a [`RoadGraph`] and a [`CongestionSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteSolver {
    pub weights: CostWeights,
}

impl RouteSolver {
    pub fn new(weights: CostWeights) -> Self {
        Self { weights }
    }

    /// Answer a [`RouteQuery`].
    ///
    /// # Errors
    ///
    /// - `Unreachable` for the point-to-point modes when the target's
    ///   distance stays infinite.  Callers that can proceed anyway should
    ///   fall back to [`Route::direct`].
    /// - `NoReachableDestination` when no destination candidate is reachable.
    pub fn solve(
        &self,
        graph: &RoadGraph,
        congestion: &impl CongestionSource,
        query: RouteQuery<'_>,
    ) -> SpatialResult<Solution> {
        match query {
            RouteQuery::PlainShortestPath { start, target } => {
                let search = dijkstra(graph, start, Some(target), |_, _, w| w);
                let route = search.route_to(start, target)?;
                Ok(Solution { route, destination: None })
            }

            RouteQuery::CongestionWeightedPath { start, target } => {
                let cost = self.congestion_cost(congestion);
                let search = dijkstra(graph, start, Some(target), cost);
                let route = search.route_to(start, target)?;
                Ok(Solution { route, destination: None })
            }

            RouteQuery::WeightedDestinationSelection { start, destinations } => {
                self.select_destination(graph, congestion, start, destinations)
            }
        }
    }

    /// The spawn junction for a new agent: the reachable junction farthest
    /// from `reference` by plain shortest-path distance.
    pub fn farthest_spawn(
        &self,
        graph: &RoadGraph,
        reference: JunctionId,
    ) -> SpatialResult<JunctionId> {
        Ok(self.farthest_spawns(graph, reference, 1)?[0])
    }

    /// The `k` most distant reachable junctions from `reference`, descending
    /// by distance (index order within ties).  `reference` itself is never a
    /// candidate.  Returns fewer than `k` when the reachable set is small.
    pub fn farthest_spawns(
        &self,
        graph: &RoadGraph,
        reference: JunctionId,
        k: usize,
    ) -> SpatialResult<Vec<JunctionId>> {
        let search = dijkstra(graph, reference, None, |_, _, w| w);

        let mut candidates: Vec<(Reverse<OrderedFloat<f64>>, JunctionId)> = search
            .dist
            .iter()
            .enumerate()
            .filter(|&(i, d)| d.is_finite() && i != reference.index())
            .map(|(i, &d)| (Reverse(OrderedFloat(d)), JunctionId(i as u32)))
            .collect();

        if candidates.is_empty() {
            return Err(SpatialError::NoSpawnCandidate { reference });
        }
        candidates.sort_unstable();
        if candidates.len() < k {
            warn!(
                "requested {k} spawn junctions but only {} are reachable from {reference}",
                candidates.len()
            );
        }
        Ok(candidates.into_iter().take(k).map(|(_, j)| j).collect())
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Edge cost closure for the congestion-weighted modes.  `max_c` is
    /// captured here, once per solve.
    fn congestion_cost<'a, C: CongestionSource>(
        &'a self,
        congestion: &'a C,
    ) -> impl Fn(JunctionId, JunctionId, f64) -> f64 + 'a {
        let max_c = congestion.max().max(1) as f64;
        move |u, v, weight| {
            let traffic = (congestion.count(u) + congestion.count(v)) as f64 / 2.0;
            self.weights.alpha * weight + self.weights.beta * traffic / max_c
        }
    }

    fn select_destination(
        &self,
        graph: &RoadGraph,
        congestion: &impl CongestionSource,
        start: JunctionId,
        destinations: &DestinationRegistry,
    ) -> SpatialResult<Solution> {
        let max_capacity = destinations.max_capacity().max(1) as f64;

        let mut best: Option<(f64, DestinationId, Route)> = None;

        for (id, dest) in destinations.iter() {
            let target = destinations.junction(id);
            if target == JunctionId::INVALID {
                continue;
            }
            let cost = self.congestion_cost(congestion);
            let search = dijkstra(graph, start, Some(target), cost);
            let Ok(route) = search.route_to(start, target) else {
                continue;
            };

            let capacity_penalty = 1.0 - dest.capacity as f64 / max_capacity;
            let capability_penalty = if dest.capable { 0.0 } else { 1.0 };
            let total = route.cost + self.weights.gamma * (capacity_penalty + capability_penalty);

            // Strict less-than: ties resolve to the first destination seen.
            if best.as_ref().is_none_or(|(b, _, _)| total < *b) {
                best = Some((total, id, route));
            }
        }

        match best {
            Some((total, id, route)) => {
                debug!("selected destination {id} at total cost {total:.3}");
                Ok(Solution { route, destination: Some(id) })
            }
            None => Err(SpatialError::NoReachableDestination { start }),
        }
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

struct Search {
    dist: Vec<f64>,
    prev: Vec<JunctionId>,
}

impl Search {
    /// Reconstruct the route to `target`, or `Unreachable` if its distance
    /// stayed infinite.
    fn route_to(&self, start: JunctionId, target: JunctionId) -> SpatialResult<Route> {
        let cost = self.dist[target.index()];
        if !cost.is_finite() {
            return Err(SpatialError::Unreachable { from: start, to: target });
        }

        let mut junctions = vec![target];
        let mut current = target;
        while current != start {
            current = self.prev[current.index()];
            if current == JunctionId::INVALID {
                break;
            }
            junctions.push(current);
        }
        junctions.reverse();
        Ok(Route { junctions, cost })
    }
}

/// Priority-queue shortest path from `start`.
///
/// Pops stop early when `target` is reached; with `target = None` the search
/// exhausts the reachable component (used for farthest-junction selection).
fn dijkstra<F>(
    graph: &RoadGraph,
    start: JunctionId,
    target: Option<JunctionId>,
    edge_cost: F,
) -> Search
where
    F: Fn(JunctionId, JunctionId, f64) -> f64,
{
    let n = graph.junction_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev = vec![JunctionId::INVALID; n];
    dist[start.index()] = 0.0;

    // Min-heap via Reverse; the JunctionId secondary key makes equal-cost
    // pops deterministic.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, JunctionId)>> = BinaryHeap::new();
    heap.push(Reverse((OrderedFloat(0.0), start)));

    while let Some(Reverse((cost, junction))) = heap.pop() {
        if target == Some(junction) {
            break;
        }
        // Skip stale heap entries.
        if cost.0 > dist[junction.index()] {
            continue;
        }

        for (neighbor, weight) in graph.neighbors(junction) {
            let next = cost.0 + edge_cost(junction, neighbor, weight);
            if next < dist[neighbor.index()] {
                dist[neighbor.index()] = next;
                prev[neighbor.index()] = junction;
                heap.push(Reverse((OrderedFloat(next), neighbor)));
            }
        }
    }

    Search { dist, prev }
}
