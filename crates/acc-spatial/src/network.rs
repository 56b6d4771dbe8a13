//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the `EdgeId` range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! All edge columns (`edge_from`, `edge_to`, `edge_key`, `edge_length_m`,
//! `edge_class`) are sorted by source node and indexed by `EdgeId`.  The sort
//! is stable, so parallel edges between the same pair keep their insertion
//! order; [`RoadGraph::parallel_edges`] relies on this.
//!
//! # Immutability
//!
//! A built `RoadGraph` exposes no mutating methods.  Anything derived from
//! its node set (the spatial index, edge weights) is therefore valid for the
//! lifetime of the graph; a different node set means a different graph and
//! a fresh index.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use serde::Deserialize;

use acc_core::{BBox, EdgeId, NodeId, XY};

use crate::{EdgeKey, SpatialError, SpatialResult};

// ── Road class ────────────────────────────────────────────────────────────────

/// A road-class tag exactly as a loader may find it: a single value or a
/// list of values (merged ways carry several).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawRoadClass {
    One(String),
    Many(Vec<String>),
}

/// Canonical road class, resolved once at ingestion.
///
/// A list tag resolves to its first element.  Blank strings and empty lists
/// resolve to "missing", which the weight model maps to its default speed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RoadClass(Option<String>);

impl RoadClass {
    pub fn missing() -> Self {
        Self(None)
    }

    pub fn new(class: impl Into<String>) -> Self {
        let class = class.into();
        let trimmed = class.trim();
        if trimmed.is_empty() {
            Self(None)
        } else if trimmed.len() == class.len() {
            Self(Some(class))
        } else {
            Self(Some(trimmed.to_owned()))
        }
    }

    /// Normalize a raw tag.
    pub fn from_raw(raw: Option<RawRoadClass>) -> Self {
        match raw {
            None => Self::missing(),
            Some(RawRoadClass::One(s)) => Self::new(s),
            Some(RawRoadClass::Many(list)) => list
                .into_iter()
                .next()
                .map(Self::new)
                .unwrap_or_default(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_missing(&self) -> bool {
        self.0.is_none()
    }
}

impl From<&str> for RoadClass {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Per-edge attributes supplied by a loader.
///
/// `length_m` is optional here because loaders pass through what the source
/// data has; the weight model rejects edges without a usable length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeAttrs {
    pub length_m:   Option<f64>,
    pub road_class: RoadClass,
}

impl EdgeAttrs {
    pub fn new(length_m: f64, road_class: impl Into<RoadClass>) -> Self {
        Self { length_m: Some(length_m), road_class: road_class.into() }
    }
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed multigraph of road nodes (projected metres) in CSR format.
///
/// Do not construct directly; use [`RoadGraphBuilder`].
#[derive(Debug)]
pub struct RoadGraph {
    node_pos:       Vec<XY>,
    node_ext_id:    Vec<i64>,
    ext_lookup:     HashMap<i64, NodeId>,

    /// CSR row pointer.  Length = `node_count + 1`.
    node_out_start: Vec<u32>,

    edge_from:      Vec<NodeId>,
    edge_to:        Vec<NodeId>,
    edge_key:       Vec<u32>,
    edge_length_m:  Vec<Option<f64>>,
    edge_class:     Vec<RoadClass>,
}

impl RoadGraph {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    // ── Node data ─────────────────────────────────────────────────────────

    /// Node coordinates indexed by `NodeId`.
    pub fn node_coords(&self) -> &[XY] {
        &self.node_pos
    }

    #[inline]
    pub fn node_pos(&self, node: NodeId) -> XY {
        self.node_pos[node.index()]
    }

    /// Identifier the loader used for this node (e.g. an OSM id).
    #[inline]
    pub fn node_ext_id(&self, node: NodeId) -> i64 {
        self.node_ext_id[node.index()]
    }

    pub fn node_by_ext_id(&self, ext_id: i64) -> Option<NodeId> {
        self.ext_lookup.get(&ext_id).copied()
    }

    /// All node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.node_count()).map(|i| NodeId(i as u32))
    }

    /// Bounding box of the node coordinates; `None` for an empty graph.
    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(self.node_pos.iter().copied())
    }

    // ── Edge data ─────────────────────────────────────────────────────────

    #[inline]
    pub fn edge_from(&self, edge: EdgeId) -> NodeId {
        self.edge_from[edge.index()]
    }

    #[inline]
    pub fn edge_to(&self, edge: EdgeId) -> NodeId {
        self.edge_to[edge.index()]
    }

    #[inline]
    pub fn edge_key(&self, edge: EdgeId) -> u32 {
        self.edge_key[edge.index()]
    }

    #[inline]
    pub fn edge_length_m(&self, edge: EdgeId) -> Option<f64> {
        self.edge_length_m[edge.index()]
    }

    #[inline]
    pub fn edge_class(&self, edge: EdgeId) -> &RoadClass {
        &self.edge_class[edge.index()]
    }

    /// External `(u, v, key)` identity of an edge, for reporting.
    pub fn edge_ext_key(&self, edge: EdgeId) -> EdgeKey {
        EdgeKey {
            from: self.node_ext_id(self.edge_from(edge)),
            to:   self.node_ext_id(self.edge_to(edge)),
            key:  self.edge_key(edge),
        }
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edge_count()).map(|i| EdgeId(i as u32))
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    #[inline]
    fn out_range(&self, node: NodeId) -> Range<usize> {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        start..end
    }

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range; no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_range(node).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_range(node).len()
    }

    /// Edges `from → to`, in insertion order.
    pub fn parallel_edges(&self, from: NodeId, to: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_edges(from).filter(move |&e| self.edge_to(e) == to)
    }

    /// The edge identified exactly by `(from, to, key)`.
    pub fn find_edge(&self, from: NodeId, to: NodeId, key: u32) -> Option<EdgeId> {
        self.parallel_edges(from, to).find(|&e| self.edge_key(e) == key)
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Nodes and edges may arrive in any order.  Edge identity `(from, to, key)`
/// must be unique; the builder rejects duplicates instead of guessing which
/// parallel edge a later attribute belongs to.
///
/// # Example
///
/// ```
/// use acc_core::XY;
/// use acc_spatial::{EdgeAttrs, RoadGraphBuilder};
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_node(1, XY::new(0.0, 0.0)).unwrap();
/// let c = b.add_node(2, XY::new(100.0, 0.0)).unwrap();
/// b.add_road(a, c, EdgeAttrs::new(100.0, "residential")).unwrap();
/// let g = b.build();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 2); // bidirectional
/// ```
#[derive(Default)]
pub struct RoadGraphBuilder {
    nodes:      Vec<XY>,
    ext_ids:    Vec<i64>,
    ext_lookup: HashMap<i64, NodeId>,
    raw_edges:  Vec<RawEdge>,
    seen:       HashSet<(NodeId, NodeId, u32)>,
    pair_count: HashMap<(NodeId, NodeId), u32>,
}

struct RawEdge {
    from:  NodeId,
    to:    NodeId,
    key:   u32,
    attrs: EdgeAttrs,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:      Vec::with_capacity(nodes),
            ext_ids:    Vec::with_capacity(nodes),
            ext_lookup: HashMap::with_capacity(nodes),
            raw_edges:  Vec::with_capacity(edges),
            seen:       HashSet::with_capacity(edges),
            pair_count: HashMap::with_capacity(edges),
        }
    }

    /// Add a node and return its dense `NodeId` (sequential from 0).
    pub fn add_node(&mut self, ext_id: i64, pos: XY) -> SpatialResult<NodeId> {
        if self.ext_lookup.contains_key(&ext_id) {
            return Err(SpatialError::DuplicateNode(ext_id));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.ext_ids.push(ext_id);
        self.ext_lookup.insert(ext_id, id);
        Ok(id)
    }

    pub fn node_by_ext_id(&self, ext_id: i64) -> Option<NodeId> {
        self.ext_lookup.get(&ext_id).copied()
    }

    pub fn node_pos(&self, id: NodeId) -> XY {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Add a directed edge with an explicit parallel-edge key.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, key: u32, attrs: EdgeAttrs) -> SpatialResult<()> {
        for n in [from, to] {
            if n.index() >= self.nodes.len() {
                return Err(SpatialError::UnknownNode(n));
            }
        }
        if !self.seen.insert((from, to, key)) {
            return Err(SpatialError::DuplicateEdge { from, to, key });
        }
        *self.pair_count.entry((from, to)).or_default() += 1;
        self.raw_edges.push(RawEdge { from, to, key, attrs });
        Ok(())
    }

    /// Add a directed edge under the next unused key for `(from, to)`.
    /// Returns the key assigned.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, attrs: EdgeAttrs) -> SpatialResult<u32> {
        let mut key = self.pair_count.get(&(from, to)).copied().unwrap_or(0);
        while self.seen.contains(&(from, to, key)) {
            key += 1;
        }
        self.add_edge(from, to, key, attrs)?;
        Ok(key)
    }

    /// Convenience: add edges in **both directions** for a two-way road.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, attrs: EdgeAttrs) -> SpatialResult<()> {
        self.add_directed_edge(a, b, attrs.clone())?;
        self.add_directed_edge(b, a, attrs)?;
        Ok(())
    }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Time complexity: O(E log E) for the edge sort.
    pub fn build(self) -> RoadGraph {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Stable: parallel edges keep insertion order.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let mut edge_from     = Vec::with_capacity(edge_count);
        let mut edge_to       = Vec::with_capacity(edge_count);
        let mut edge_key      = Vec::with_capacity(edge_count);
        let mut edge_length_m = Vec::with_capacity(edge_count);
        let mut edge_class    = Vec::with_capacity(edge_count);
        for e in raw {
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_key.push(e.key);
            edge_length_m.push(e.attrs.length_m);
            edge_class.push(e.attrs.road_class);
        }

        RoadGraph {
            node_pos: self.nodes,
            node_ext_id: self.ext_ids,
            ext_lookup: self.ext_lookup,
            node_out_start,
            edge_from,
            edge_to,
            edge_key,
            edge_length_m,
            edge_class,
        }
    }
}
