//! Spatial-subsystem error type.

use std::fmt;

use thiserror::Error;

use acc_core::{BBox, CoreError, NodeId};

/// External identity of a directed edge: `(u, v, key)` using the node ids
/// supplied by the graph loader.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub from: i64,
    pub to:   i64,
    pub key:  u32,
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.from, self.to, self.key)
    }
}

/// Errors produced by `acc-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("coordinate at position {index} is not finite")]
    InvalidCoordinate { index: usize },

    #[error("{coords} coordinates but {ids} node ids")]
    LengthMismatch { coords: usize, ids: usize },

    #[error("{} edge(s) lack a usable length attribute: {}", .edges.len(), preview(.edges))]
    MissingAttribute { edges: Vec<EdgeKey> },

    #[error("node {0} not found in graph")]
    UnknownNode(NodeId),

    #[error("external node id {0} added twice")]
    DuplicateNode(i64),

    #[error("edge ({from}, {to}, key {key}) added twice")]
    DuplicateEdge { from: NodeId, to: NodeId, key: u32 },

    #[error("no edge from {from} to {to}")]
    EdgeNotFound { from: NodeId, to: NodeId },

    #[error("travel time must be finite and >= 0 s, got {0}")]
    InvalidTravelTime(f64),

    #[error("point extent {points} does not overlap road graph extent {graph}; \
             are points and graph in the same coordinate system?")]
    InconsistentCoordinateSystem { points: BBox, graph: BBox },

    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type SpatialResult<T> = Result<T, SpatialError>;

/// First few offending edges, for error messages on large graphs.
fn preview(edges: &[EdgeKey]) -> String {
    const SHOWN: usize = 5;
    let mut s = edges
        .iter()
        .take(SHOWN)
        .map(EdgeKey::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if edges.len() > SHOWN {
        s.push_str(&format!(", … ({} more)", edges.len() - SHOWN));
    }
    s
}
