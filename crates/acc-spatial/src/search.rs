//! Multi-source shortest-path search with a cost cutoff.
//!
//! # Pluggability
//!
//! The engine calls the search through the [`ShortestPathSearch`] trait, so
//! applications can swap in another algorithm (contraction hierarchies,
//! a bucket queue for integer costs) without touching the engine.  The
//! default [`MultiSourceDijkstra`] is a binary-heap Dijkstra over the CSR
//! graph.
//!
//! # Semantics
//!
//! Every source starts at cost 0.  The result holds, for each node whose
//! cheapest cost from *any* source is `<= cutoff_secs`, that cost.  Paths
//! whose accumulated cost passes the cutoff are dropped rather than
//! truncated, so absent nodes are unreachable within the cutoff.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use acc_core::NodeId;

use crate::weights::WeightedGraph;
use crate::{SpatialError, SpatialResult};

/// Node → travel time in seconds.
#[cfg(not(feature = "fx-hash"))]
pub type NodeTimes = std::collections::HashMap<NodeId, f64>;

/// Node → travel time in seconds.
#[cfg(feature = "fx-hash")]
pub type NodeTimes = rustc_hash::FxHashMap<NodeId, f64>;

// ── ShortestPathSearch trait ──────────────────────────────────────────────────

/// Pluggable multi-source search.
///
/// Implementations must be deterministic: identical graph, sources, and
/// cutoff produce an identical map.
pub trait ShortestPathSearch: Send + Sync {
    fn search(
        &self,
        graph:       &WeightedGraph,
        sources:     &[NodeId],
        cutoff_secs: f64,
    ) -> SpatialResult<NodeTimes>;
}

// ── MultiSourceDijkstra ───────────────────────────────────────────────────────

/// Dijkstra initialised from all sources at once.  O((V + E) log V),
/// bounded in practice by the cutoff.
#[derive(Copy, Clone, Debug, Default)]
pub struct MultiSourceDijkstra;

impl ShortestPathSearch for MultiSourceDijkstra {
    fn search(
        &self,
        graph:       &WeightedGraph,
        sources:     &[NodeId],
        cutoff_secs: f64,
    ) -> SpatialResult<NodeTimes> {
        multi_source_dijkstra(graph, sources, cutoff_secs)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeId,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost; NodeId as secondary key for deterministic pops.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn multi_source_dijkstra(
    weighted:    &WeightedGraph,
    sources:     &[NodeId],
    cutoff_secs: f64,
) -> SpatialResult<NodeTimes> {
    let graph = weighted.graph();
    let n = graph.node_count();

    let mut dist    = vec![f64::INFINITY; n];
    let mut settled = vec![false; n];
    let mut heap    = BinaryHeap::with_capacity(sources.len());

    for &s in sources {
        if !graph.contains_node(s) {
            return Err(SpatialError::UnknownNode(s));
        }
        if dist[s.index()] > 0.0 {
            dist[s.index()] = 0.0;
            heap.push(State { cost: 0.0, node: s });
        }
    }

    let mut times = NodeTimes::default();

    while let Some(State { cost, node }) = heap.pop() {
        // Skip stale heap entries.
        if settled[node.index()] || cost > dist[node.index()] {
            continue;
        }
        settled[node.index()] = true;
        times.insert(node, cost);

        for edge in graph.out_edges(node) {
            let next = graph.edge_to(edge);
            if settled[next.index()] {
                continue;
            }
            let next_cost = cost + weighted.travel_secs(edge);
            if next_cost > cutoff_secs {
                continue;
            }
            if next_cost < dist[next.index()] {
                dist[next.index()] = next_cost;
                heap.push(State { cost: next_cost, node: next });
            }
        }
    }

    Ok(times)
}
