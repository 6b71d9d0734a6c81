//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format.  Given a
//! `JunctionId j`, its outgoing half-edges occupy the slice:
//!
//! ```text
//! edge_to[ out_start[j] .. out_start[j+1] ]
//! ```
//!
//! The graph is undirected: every edge contributes two half-edges with equal
//! weight.  Parallel edges between the same pair are kept (the snapped
//! street network is a multigraph in practice, though typically simple);
//! self-loops are discarded at build time.

use log::{debug, warn};

use gw_core::{GridPoint, JunctionId};

use crate::GeometryStore;

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Undirected weighted junction graph in CSR form.
///
/// Owns its junction positions (copied from the [`GeometryStore`] at build
/// time) so route consumers don't need the store once the graph exists.
/// Construct via [`build_graph`] or [`RoadGraphBuilder`].
pub struct RoadGraph {
    positions: Vec<GridPoint>,
    /// CSR row pointer; length = junction_count + 1.
    out_start: Vec<u32>,
    /// Neighbor of each half-edge, grouped by source junction.
    edge_to: Vec<JunctionId>,
    /// Length of each half-edge.
    edge_weight: Vec<f64>,
}

impl RoadGraph {
    pub fn junction_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of undirected edges (half-edge count / 2).
    pub fn edge_count(&self) -> usize {
        self.edge_to.len() / 2
    }

    /// `true` when no edge was added (e.g. no polyline snapped successfully).
    pub fn has_no_edges(&self) -> bool {
        self.edge_to.is_empty()
    }

    #[inline]
    pub fn position(&self, junction: JunctionId) -> GridPoint {
        self.positions[junction.index()]
    }

    /// Iterator over `(neighbor, weight)` for all edges out of `junction`.
    ///
    /// A contiguous index range — no heap allocation.
    #[inline]
    pub fn neighbors(&self, junction: JunctionId) -> impl Iterator<Item = (JunctionId, f64)> + '_ {
        let start = self.out_start[junction.index()] as usize;
        let end = self.out_start[junction.index() + 1] as usize;
        (start..end).map(|i| (self.edge_to[i], self.edge_weight[i]))
    }

    /// Degree of `junction`.
    #[inline]
    pub fn degree(&self, junction: JunctionId) -> usize {
        let start = self.out_start[junction.index()] as usize;
        let end = self.out_start[junction.index() + 1] as usize;
        end - start
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Accepts junctions and undirected edges in any order; `build()` sorts the
/// half-edges by source and assembles the CSR arrays.  [`build_graph`] is the
/// snapping front-end over this builder; tests and synthetic scenarios use it
/// directly to control edge weights.
pub struct RoadGraphBuilder {
    positions: Vec<GridPoint>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from: JunctionId,
    to: JunctionId,
    weight: f64,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self { positions: Vec::new(), raw_edges: Vec::new() }
    }

    /// Seed the junction table from a geometry store's positions.
    pub fn from_store(store: &GeometryStore) -> Self {
        Self {
            positions: store.positions().to_vec(),
            raw_edges: Vec::new(),
        }
    }

    /// Add a junction and return its id (sequential from 0).
    pub fn add_junction(&mut self, position: GridPoint) -> JunctionId {
        let id = JunctionId(self.positions.len() as u32);
        self.positions.push(position);
        id
    }

    /// Add an undirected edge with an explicit weight.  Self-loops are
    /// dropped.
    pub fn add_road(&mut self, a: JunctionId, b: JunctionId, weight: f64) {
        if a == b {
            return;
        }
        self.raw_edges.push(RawEdge { from: a, to: b, weight });
        self.raw_edges.push(RawEdge { from: b, to: a, weight });
    }

    /// Add an undirected edge weighted by the Euclidean distance between the
    /// two junction positions.
    pub fn add_road_euclidean(&mut self, a: JunctionId, b: JunctionId) {
        let weight = self.positions[a.index()].distance(self.positions[b.index()]);
        self.add_road(a, b, weight);
    }

    pub fn junction_count(&self) -> usize {
        self.positions.len()
    }

    /// Consume the builder and produce a [`RoadGraph`].
    pub fn build(self) -> RoadGraph {
        let junction_count = self.positions.len();
        let mut raw = self.raw_edges;

        // Stable sort by source keeps insertion order within a junction's
        // edge list, so identical inputs build identical graphs.
        raw.sort_by_key(|e| e.from);

        let edge_to: Vec<JunctionId> = raw.iter().map(|e| e.to).collect();
        let edge_weight: Vec<f64> = raw.iter().map(|e| e.weight).collect();

        let mut out_start = vec![0u32; junction_count + 1];
        for e in &raw {
            out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=junction_count {
            out_start[i] += out_start[i - 1];
        }
        debug_assert_eq!(out_start[junction_count] as usize, edge_to.len());

        RoadGraph {
            positions: self.positions,
            out_start,
            edge_to,
            edge_weight,
        }
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Snapping front-end ────────────────────────────────────────────────────────

/// Build the road graph by snapping each polyline's endpoints to junctions.
///
/// Polylines with fewer than two points, or whose endpoints snap to the same
/// junction, contribute nothing.  Edge weight is the Euclidean distance
/// between the two snapped junction *positions* (not the polyline arc
/// length).  A graph with zero edges is reported via `warn!` but returned —
/// the failure surfaces later as unreachable-route errors, which callers
/// handle.
pub fn build_graph(store: &GeometryStore, polylines: &[Vec<GridPoint>]) -> RoadGraph {
    let mut builder = RoadGraphBuilder::from_store(store);
    let mut degenerate = 0usize;

    for poly in polylines {
        if poly.len() < 2 {
            continue;
        }
        let (Some(a), Some(b)) = (
            store.nearest_junction(poly[0]),
            store.nearest_junction(poly[poly.len() - 1]),
        ) else {
            continue;
        };
        if a == b {
            degenerate += 1;
            continue;
        }
        builder.add_road_euclidean(a, b);
    }

    if degenerate > 0 {
        debug!("dropped {degenerate} polyline(s) whose endpoints snapped to one junction");
    }

    let graph = builder.build();
    if graph.has_no_edges() {
        warn!("no polylines snapped to distinct junctions; graph has no edges");
    }
    graph
}
