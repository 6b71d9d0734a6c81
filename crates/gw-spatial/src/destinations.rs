//! Candidate destination (hospital) registry.
//!
//! # File format
//!
//! One row per destination, no header:
//!
//! ```csv
//! 120,87,220,1.0
//! 455,310,80,0.0
//! ```
//!
//! Columns: `x`, `y`, `capacity` (bed count), `capability` (≥ 1.0 means the
//! required emergency capability is present).  Malformed rows are skipped
//! and counted, matching the tolerant record reader.

use std::io::Read;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use gw_core::{DestinationId, GridPoint, JunctionId};

use crate::{GeometryStore, SpatialResult};

// ── Destination ───────────────────────────────────────────────────────────────

/// A static destination candidate, scored by the route solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    pub position: GridPoint,
    /// Capacity (bed count); larger is preferred.
    pub capacity: u32,
    /// Whether the destination has the required capability.
    pub capable: bool,
}

#[derive(Deserialize)]
struct DestinationRecord {
    x: u16,
    y: u16,
    capacity: u32,
    capability: f32,
}

// ── DestinationRegistry ───────────────────────────────────────────────────────

/// All destination candidates for a run, pre-snapped to their nearest
/// junctions.  Static once built; iteration order is file/insertion order,
/// which is also the solver's tie-break order.
pub struct DestinationRegistry {
    destinations: Vec<Destination>,
    snapped: Vec<JunctionId>,
}

impl DestinationRegistry {
    /// Build a registry, snapping every destination to its nearest junction.
    ///
    /// Destinations that cannot snap (empty geometry) keep
    /// `JunctionId::INVALID` and are ignored by the solver.
    pub fn new(destinations: Vec<Destination>, store: &GeometryStore) -> Self {
        let snapped = destinations
            .iter()
            .map(|d| store.nearest_junction(d.position).unwrap_or(JunctionId::INVALID))
            .collect();
        Self { destinations, snapped }
    }

    /// Load a registry from a headerless `x,y,capacity,capability` CSV file.
    pub fn load_csv(path: &Path, store: &GeometryStore) -> SpatialResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, store)
    }

    /// Like [`load_csv`](Self::load_csv) but from any `Read` source (tests
    /// pass a `Cursor`).
    pub fn from_reader<R: Read>(reader: R, store: &GeometryStore) -> SpatialResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(reader);

        let mut destinations = Vec::new();
        let mut skipped = 0usize;
        for result in csv_reader.deserialize::<DestinationRecord>() {
            match result {
                Ok(row) => destinations.push(Destination {
                    position: GridPoint::new(row.x, row.y),
                    capacity: row.capacity,
                    capable: row.capability >= 1.0,
                }),
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!("skipped {skipped} malformed destination row(s)");
        }

        Ok(Self::new(destinations, store))
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn get(&self, id: DestinationId) -> &Destination {
        &self.destinations[id.index()]
    }

    /// The junction the destination snapped to (`INVALID` when snapping
    /// failed).
    pub fn junction(&self, id: DestinationId) -> JunctionId {
        self.snapped[id.index()]
    }

    /// Largest capacity over all destinations (0 when empty) — the
    /// denominator of the solver's capacity penalty.
    pub fn max_capacity(&self) -> u32 {
        self.destinations.iter().map(|d| d.capacity).max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DestinationId, &Destination)> {
        self.destinations
            .iter()
            .enumerate()
            .map(|(i, d)| (DestinationId(i as u16), d))
    }
}
