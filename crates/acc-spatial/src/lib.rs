//! `acc-spatial`: road graph, node snapping, edge weights, and search.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`network`] | `RoadGraph` (CSR), `RoadGraphBuilder`, `RoadClass`            |
//! | [`index`]   | `SpatialIndex` (R-tree), `Snapper`, `Projection`              |
//! | [`weights`] | `EdgeWeightModel`, `WeightedGraph`                            |
//! | [`search`]  | `ShortestPathSearch` trait, `MultiSourceDijkstra`, `NodeTimes` |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Batched nearest-node queries run on Rayon's pool.           |
//! | `fx-hash`  | `NodeTimes` uses FxHash instead of SipHash.                 |
//! | `serde`    | Derives `Serialize`/`Deserialize` on `acc-core` types.      |

pub mod error;
pub mod index;
pub mod network;
pub mod search;
pub mod weights;


pub use error::{EdgeKey, SpatialError, SpatialResult};
pub use index::{Affine, Identity, Projection, Snapper, SpatialIndex};
pub use network::{EdgeAttrs, RawRoadClass, RoadClass, RoadGraph, RoadGraphBuilder};
pub use search::{MultiSourceDijkstra, NodeTimes, ShortestPathSearch};
pub use weights::{EdgeWeightModel, WeightedGraph};
