//! `gw-spatial` — junction geometry, the road graph, and routing.
//!
//! # Pipeline position
//!
//! Junction and polyline record words (decoded by `gw-records`) feed a
//! [`GeometryStore`]; [`build_graph`] snaps polyline endpoints to junctions
//! and produces the [`RoadGraph`]; [`RouteSolver`] answers shortest-path,
//! congestion-weighted, and destination-selection queries over it.
//!
//! # Modules
//!
//! | Module           | Contents                                         |
//! |------------------|--------------------------------------------------|
//! | [`geometry`]     | `GeometryStore`: junction table + snapping       |
//! | [`graph`]        | `RoadGraph` (CSR) + `build_graph`                |
//! | [`router`]       | `RouteSolver`, `RouteQuery`, `Route`             |
//! | [`destinations`] | `Destination`, `DestinationRegistry`, CSV loader |

pub mod destinations;
pub mod geometry;
pub mod graph;
pub mod router;

mod error;


pub use destinations::{Destination, DestinationRegistry};
pub use error::{SpatialError, SpatialResult};
pub use geometry::GeometryStore;
pub use graph::{RoadGraph, RoadGraphBuilder, build_graph};
pub use router::{
    CongestionSource, CostWeights, Route, RouteQuery, RouteSolver, Solution, ZeroCongestion,
};
