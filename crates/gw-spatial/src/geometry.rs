//! Junction table and point snapping.
//!
//! # Snapping
//!
//! Polyline endpoints usually coincide exactly with a junction coordinate,
//! so [`GeometryStore::nearest_junction`] first consults an exact-coordinate
//! hash map.  On a miss it falls back to an R-tree nearest-neighbor query —
//! minimum squared Euclidean distance over all junctions.  Snapping runs at
//! graph-build time only, never per tick.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use gw_core::{GridPoint, JunctionId};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the spatial index: a 2-D point with its `JunctionId`.
#[derive(Clone)]
struct JunctionEntry {
    point: [f32; 2],
    id: JunctionId,
}

impl RTreeObject for JunctionEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for JunctionEntry {
    /// Squared Euclidean distance in grid space.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── GeometryStore ─────────────────────────────────────────────────────────────

/// The junction table: positions indexed by `JunctionId`, plus the snapping
/// indices.  Junction identity is the dense zero-based position in the input
/// sequence and is fixed for the lifetime of the store.
pub struct GeometryStore {
    junctions: Vec<GridPoint>,
    /// Exact-coordinate fast path.  First junction wins for duplicate
    /// coordinates; the R-tree is only consulted on a miss.
    exact: FxHashMap<(u16, u16), JunctionId>,
    spatial_idx: RTree<JunctionEntry>,
}

impl GeometryStore {
    /// Build a store from an ordered junction position sequence.
    pub fn new(junctions: Vec<GridPoint>) -> Self {
        let mut exact = FxHashMap::default();
        for (i, p) in junctions.iter().enumerate() {
            exact.entry((p.x, p.y)).or_insert(JunctionId(i as u32));
        }

        let entries: Vec<JunctionEntry> = junctions
            .iter()
            .enumerate()
            .map(|(i, p)| JunctionEntry {
                point: [p.x as f32, p.y as f32],
                id: JunctionId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        Self { junctions, exact, spatial_idx }
    }

    /// Decode junction record words (see `gw_records::words`) into a store.
    pub fn from_words(words: &[u32]) -> Self {
        Self::new(words.iter().map(|&w| gw_records::words::unpack_junction(w)).collect())
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.junctions.is_empty()
    }

    /// Position of `junction`.
    #[inline]
    pub fn position(&self, junction: JunctionId) -> GridPoint {
        self.junctions[junction.index()]
    }

    /// All positions, indexed by `JunctionId`.
    pub fn positions(&self) -> &[GridPoint] {
        &self.junctions
    }

    /// Snap an arbitrary point to the nearest junction.
    ///
    /// Returns `None` only when the store has no junctions.
    pub fn nearest_junction(&self, point: GridPoint) -> Option<JunctionId> {
        if let Some(&id) = self.exact.get(&(point.x, point.y)) {
            return Some(id);
        }
        self.spatial_idx
            .nearest_neighbor(&[point.x as f32, point.y as f32])
            .map(|e| e.id)
    }
}
