//! The accessibility engine and its typed states.
//!
//! # States
//!
//! | State                                   | Reached by                          |
//! |-----------------------------------------|-------------------------------------|
//! | `AccessibilityEngine<Unweighted>`       | [`AccessibilityEngine::new`]        |
//! | `AccessibilityEngine<Weighted>`         | `assign_speeds_and_travel_time`     |
//! | [`FacilityNodes`] (snapped)             | `snap_facilities`                   |
//! | [`TravelTimes`] (solved)                | `compute_accessibility`             |
//!
//! Operations that need edge weights exist only on the `Weighted` engine, so
//! calling them out of order does not compile.

use std::sync::Arc;

use acc_core::{NodeId, XY};
use acc_spatial::{
    EdgeWeightModel, MultiSourceDijkstra, NodeTimes, Projection, RoadGraph, ShortestPathSearch,
    Snapper, WeightedGraph,
};

use crate::points::{PointFeature, PopulationPoint};
use crate::summary::{AccessSummary, summarize};
use crate::{AccessError, AccessResult};

// ── State markers ─────────────────────────────────────────────────────────────

/// Edge weights not yet assigned.
pub struct Unweighted;

/// Every edge carries a travel time.
pub struct Weighted {
    graph: WeightedGraph,
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Deduplicated facility nodes: the origins of the search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacilityNodes {
    /// Ascending, unique.
    pub nodes:    Vec<NodeId>,
    /// Facilities that snapped to some node (before deduplication).
    pub snapped:  usize,
    /// Facilities skipped because their coordinates were not finite.
    pub excluded: usize,
}

impl FacilityNodes {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Node → seconds from the nearest facility, for nodes within the cutoff.
#[derive(Clone, Debug, PartialEq)]
pub struct TravelTimes {
    times:       NodeTimes,
    cutoff_secs: f64,
}

impl TravelTimes {
    pub fn empty(cutoff_secs: f64) -> Self {
        Self { times: NodeTimes::default(), cutoff_secs }
    }

    pub fn from_map(times: NodeTimes, cutoff_secs: f64) -> Self {
        Self { times, cutoff_secs }
    }

    /// Seconds to `node`, or `None` when it is beyond the cutoff.
    #[inline]
    pub fn get(&self, node: NodeId) -> Option<f64> {
        self.times.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn cutoff_secs(&self) -> f64 {
        self.cutoff_secs
    }

    /// `(node, seconds)` pairs in ascending `NodeId` order.
    pub fn to_sorted_vec(&self) -> Vec<(NodeId, f64)> {
        let mut v: Vec<(NodeId, f64)> = self.times.iter().map(|(&n, &s)| (n, s)).collect();
        v.sort_unstable_by_key(|&(n, _)| n);
        v
    }

    pub fn as_map(&self) -> &NodeTimes {
        &self.times
    }

    pub fn into_map(self) -> NodeTimes {
        self.times
    }
}

/// Everything one [`AccessibilityEngine::run`] produces.
#[derive(Clone, Debug)]
pub struct AccessRun {
    pub facilities: FacilityNodes,
    pub times:      TravelTimes,
    pub population: Vec<PopulationPoint>,
    pub summary:    AccessSummary,
}

// ── AccessibilityEngine ───────────────────────────────────────────────────────

/// Computes travel time from every population point to its nearest facility.
pub struct AccessibilityEngine<S = Unweighted> {
    graph:        Arc<RoadGraph>,
    snapper:      Snapper,
    facilities:   Vec<PointFeature>,
    population:   Vec<PopulationPoint>,
    check_extent: bool,
    state:        S,
}

impl AccessibilityEngine<Unweighted> {
    /// Index the graph's nodes and take ownership of the point sets.
    ///
    /// # Errors
    ///
    /// [`SpatialError::EmptyInput`](acc_spatial::SpatialError::EmptyInput)
    /// when the graph has no nodes.
    pub fn new(
        graph:      Arc<RoadGraph>,
        facilities: Vec<PointFeature>,
        population: Vec<PopulationPoint>,
    ) -> AccessResult<Self> {
        let snapper = Snapper::for_graph(&graph)?;
        log::info!(
            "engine ready: {} nodes, {} edges, {} facilities, {} population points",
            graph.node_count(),
            graph.edge_count(),
            facilities.len(),
            population.len()
        );
        Ok(Self {
            graph,
            snapper,
            facilities,
            population,
            check_extent: true,
            state: Unweighted,
        })
    }

    /// Project point features into graph coordinates before snapping.
    pub fn with_projection(mut self, projection: Box<dyn Projection>) -> Self {
        self.snapper = self.snapper.with_projection(projection);
        self
    }

    /// Enable or disable the coordinate-extent sanity check (default on).
    pub fn check_extent(mut self, enabled: bool) -> Self {
        self.check_extent = enabled;
        self
    }

    /// Weight every edge and move to the `Weighted` state.
    pub fn assign_speeds_and_travel_time(
        self,
        model: &EdgeWeightModel,
    ) -> AccessResult<AccessibilityEngine<Weighted>> {
        let weighted = model.assign_weights(Arc::clone(&self.graph))?;
        Ok(AccessibilityEngine {
            graph:        self.graph,
            snapper:      self.snapper,
            facilities:   self.facilities,
            population:   self.population,
            check_extent: self.check_extent,
            state:        Weighted { graph: weighted },
        })
    }
}

impl<S> AccessibilityEngine<S> {
    pub fn graph(&self) -> &Arc<RoadGraph> {
        &self.graph
    }

    pub fn snapper(&self) -> &Snapper {
        &self.snapper
    }

    pub fn facilities(&self) -> &[PointFeature] {
        &self.facilities
    }

    /// The population as supplied, without travel times.
    pub fn population(&self) -> &[PopulationPoint] {
        &self.population
    }

    /// Snap `positions`, leaving `None` for non-finite ones.
    ///
    /// Runs the extent check first when enabled.
    fn snap_positions(&self, positions: &[XY]) -> AccessResult<Vec<Option<NodeId>>> {
        if self.check_extent {
            self.snapper.check_extent(positions)?;
        }

        let finite: Vec<usize> = (0..positions.len())
            .filter(|&i| self.snapper.project(positions[i]).is_finite())
            .collect();
        let mut out = vec![None; positions.len()];
        if finite.is_empty() {
            return Ok(out);
        }

        let queries: Vec<XY> = finite.iter().map(|&i| positions[i]).collect();
        let nodes = self.snapper.snap_points_to_nodes(&queries)?;
        for (i, node) in finite.into_iter().zip(nodes) {
            out[i] = Some(node);
        }
        Ok(out)
    }
}

impl AccessibilityEngine<Weighted> {
    pub fn weighted_graph(&self) -> &WeightedGraph {
        &self.state.graph
    }

    /// Mutable access to edge travel times, e.g. to apply externally
    /// measured values with [`WeightedGraph::set_travel_time`].  Topology
    /// cannot change through this.
    pub fn weighted_graph_mut(&mut self) -> &mut WeightedGraph {
        &mut self.state.graph
    }

    /// Snap every facility to its nearest node and deduplicate.
    pub fn snap_facilities(&self) -> AccessResult<FacilityNodes> {
        if self.facilities.is_empty() {
            log::info!("no facilities supplied");
            return Ok(FacilityNodes { nodes: Vec::new(), snapped: 0, excluded: 0 });
        }

        let positions: Vec<XY> = self.facilities.iter().map(|f| f.pos).collect();
        let snapped: Vec<NodeId> = self.snap_positions(&positions)?.into_iter().flatten().collect();

        let excluded = self.facilities.len() - snapped.len();
        if excluded > 0 {
            log::warn!("{excluded} of {} facilities excluded: non-finite coordinates", self.facilities.len());
        }

        let mut nodes = snapped.clone();
        nodes.sort_unstable();
        nodes.dedup();
        log::info!(
            "{} facilities snapped to {} distinct nodes",
            snapped.len(),
            nodes.len()
        );

        Ok(FacilityNodes { nodes, snapped: snapped.len(), excluded })
    }

    /// Travel time from the nearest facility to every node within
    /// `cutoff_secs`, using the default [`MultiSourceDijkstra`].
    ///
    /// No facilities (or none snappable) yields an empty result, not an
    /// error.
    pub fn compute_accessibility(&self, cutoff_secs: f64) -> AccessResult<TravelTimes> {
        self.compute_accessibility_with(&MultiSourceDijkstra, cutoff_secs)
    }

    /// Like [`compute_accessibility`](Self::compute_accessibility) with a
    /// caller-supplied search.
    pub fn compute_accessibility_with<P: ShortestPathSearch + ?Sized>(
        &self,
        search:      &P,
        cutoff_secs: f64,
    ) -> AccessResult<TravelTimes> {
        validate_cutoff(cutoff_secs)?;
        let facilities = self.snap_facilities()?;
        self.solve(search, &facilities, cutoff_secs)
    }

    /// Run the search from already snapped facility nodes.
    pub fn solve<P: ShortestPathSearch + ?Sized>(
        &self,
        search:      &P,
        facilities:  &FacilityNodes,
        cutoff_secs: f64,
    ) -> AccessResult<TravelTimes> {
        validate_cutoff(cutoff_secs)?;
        if facilities.is_empty() {
            log::info!("no facility nodes; every node is unreachable");
            return Ok(TravelTimes::empty(cutoff_secs));
        }

        let times = search.search(&self.state.graph, &facilities.nodes, cutoff_secs)?;
        log::info!(
            "{} of {} nodes reachable within {cutoff_secs} s",
            times.len(),
            self.graph.node_count()
        );
        Ok(TravelTimes::from_map(times, cutoff_secs))
    }

    /// Annotate a copy of the population with minutes to the nearest
    /// facility.  Points whose node is absent from `times` (or that could
    /// not be snapped) get `None`.
    pub fn attach_travel_times(&self, times: &TravelTimes) -> AccessResult<Vec<PopulationPoint>> {
        if self.population.is_empty() {
            return Ok(Vec::new());
        }

        let positions: Vec<XY> = self.population.iter().map(|p| p.pos).collect();
        let nodes = self.snap_positions(&positions)?;

        let unsnappable = nodes.iter().filter(|n| n.is_none()).count();
        if unsnappable > 0 {
            log::warn!(
                "{unsnappable} of {} population points have non-finite coordinates; travel time undefined",
                self.population.len()
            );
        }

        let annotated: Vec<PopulationPoint> = self
            .population
            .iter()
            .zip(nodes)
            .map(|(p, node)| PopulationPoint {
                pos:             p.pos,
                weight:          p.weight,
                node,
                travel_time_min: node.and_then(|n| times.get(n)).map(|secs| secs / 60.0),
            })
            .collect();

        let unreached = annotated.iter().filter(|p| p.travel_time_min.is_none()).count();
        log::info!(
            "travel times attached: {} reached, {unreached} undefined",
            annotated.len() - unreached
        );
        Ok(annotated)
    }

    /// Snap, solve, attach, and summarize in one call.
    pub fn run(&self, cutoff_secs: f64, thresholds_min: &[f64]) -> AccessResult<AccessRun> {
        validate_cutoff(cutoff_secs)?;
        let facilities = self.snap_facilities()?;
        let times = self.solve(&MultiSourceDijkstra, &facilities, cutoff_secs)?;
        let population = self.attach_travel_times(&times)?;
        let summary = summarize(&population, thresholds_min);
        Ok(AccessRun { facilities, times, population, summary })
    }
}

/// Cutoffs must be non-negative; `f64::INFINITY` means unbounded.
fn validate_cutoff(cutoff_secs: f64) -> AccessResult<()> {
    if cutoff_secs.is_nan() || cutoff_secs < 0.0 {
        return Err(AccessError::InvalidCutoff(cutoff_secs));
    }
    Ok(())
}
