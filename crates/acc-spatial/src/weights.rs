//! Edge-weight model: road class → speed → travel time.
//!
//! # Cost units
//!
//! Speeds are km/h, lengths metres, travel times **seconds** (`f64`):
//!
//! ```text
//! travel_time_sec = (length_m / 1000) / speed_kph * 3600
//! ```
//!
//! Weighting never mutates the input graph.  [`EdgeWeightModel::assign_weights`]
//! returns a [`WeightedGraph`] that shares the immutable topology by `Arc`
//! and owns the per-edge speed and travel-time columns.

use std::sync::Arc;

use acc_core::{EdgeId, NodeId, SpeedTable};

use crate::network::{RoadClass, RoadGraph};
use crate::{SpatialError, SpatialResult};

// ── EdgeWeightModel ───────────────────────────────────────────────────────────

/// Maps road classes to speeds and derives per-edge travel times.
#[derive(Clone, Debug)]
pub struct EdgeWeightModel {
    speeds: SpeedTable,
}

impl EdgeWeightModel {
    /// # Errors
    ///
    /// [`SpatialError::Config`] if any speed is non-positive or non-finite.
    pub fn new(speeds: SpeedTable) -> SpatialResult<Self> {
        speeds.validate()?;
        Ok(Self { speeds })
    }

    pub fn speeds(&self) -> &SpeedTable {
        &self.speeds
    }

    /// Speed for a road class; unknown or missing classes get the default.
    #[inline]
    pub fn speed_for(&self, class: &RoadClass) -> f64 {
        self.speeds.speed_kph(class.as_str())
    }

    /// Travel time in seconds for `length_m` at `speed_kph`.
    #[inline]
    pub fn travel_time_sec(length_m: f64, speed_kph: f64) -> f64 {
        (length_m / 1000.0) / speed_kph * 3600.0
    }

    /// Weight every edge of `graph`.
    ///
    /// All edges are checked before any weight is computed; edges whose
    /// length is missing, negative, or non-finite are reported together and
    /// the pass aborts.
    pub fn assign_weights(&self, graph: Arc<RoadGraph>) -> SpatialResult<WeightedGraph> {
        let malformed: Vec<_> = graph
            .edge_ids()
            .filter(|&e| !matches!(graph.edge_length_m(e), Some(l) if l.is_finite() && l >= 0.0))
            .map(|e| graph.edge_ext_key(e))
            .collect();
        if !malformed.is_empty() {
            log::error!("{} edge(s) have no usable length; weighting aborted", malformed.len());
            return Err(SpatialError::MissingAttribute { edges: malformed });
        }

        let mut edge_speed_kph    = Vec::with_capacity(graph.edge_count());
        let mut edge_travel_secs  = Vec::with_capacity(graph.edge_count());
        let mut fallback = 0usize;

        for e in graph.edge_ids() {
            let class = graph.edge_class(e);
            if class.as_str().is_none_or(|c| !self.speeds.classes.contains_key(c)) {
                fallback += 1;
            }
            let speed = self.speed_for(class);
            // Checked above.
            let length = graph.edge_length_m(e).unwrap_or_default();
            edge_speed_kph.push(speed);
            edge_travel_secs.push(Self::travel_time_sec(length, speed));
        }

        log::info!(
            "weighted {} edges ({} at default speed {} km/h)",
            graph.edge_count(),
            fallback,
            self.speeds.default_kph
        );

        Ok(WeightedGraph { graph, edge_speed_kph, edge_travel_secs })
    }
}

impl Default for EdgeWeightModel {
    fn default() -> Self {
        Self { speeds: SpeedTable::default() }
    }
}

// ── WeightedGraph ─────────────────────────────────────────────────────────────

/// A road graph plus a travel time for every edge.
#[derive(Clone, Debug)]
pub struct WeightedGraph {
    graph:            Arc<RoadGraph>,
    edge_speed_kph:   Vec<f64>,
    edge_travel_secs: Vec<f64>,
}

impl WeightedGraph {
    pub fn graph(&self) -> &Arc<RoadGraph> {
        &self.graph
    }

    /// Travel time of `edge` in seconds.  Used as the search cost.
    #[inline]
    pub fn travel_secs(&self, edge: EdgeId) -> f64 {
        self.edge_travel_secs[edge.index()]
    }

    /// Speed assigned to `edge` by the model.  Not updated by
    /// [`set_travel_time`](Self::set_travel_time).
    #[inline]
    pub fn speed_kph(&self, edge: EdgeId) -> f64 {
        self.edge_speed_kph[edge.index()]
    }

    /// Overwrite one edge's travel time with an externally supplied value.
    ///
    /// `key` selects among parallel `from → to` edges.  When `key` is `None`
    /// or matches no parallel edge, the first parallel edge in insertion
    /// order receives the value and the others are left untouched.
    /// Returns the edge written.
    pub fn set_travel_time(
        &mut self,
        from: NodeId,
        to:   NodeId,
        key:  Option<u32>,
        secs: f64,
    ) -> SpatialResult<EdgeId> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(SpatialError::InvalidTravelTime(secs));
        }
        for n in [from, to] {
            if !self.graph.contains_node(n) {
                return Err(SpatialError::UnknownNode(n));
            }
        }

        let exact = key.and_then(|k| self.graph.find_edge(from, to, k));
        let edge = match exact {
            Some(e) => e,
            None => {
                let first = self
                    .graph
                    .parallel_edges(from, to)
                    .next()
                    .ok_or(SpatialError::EdgeNotFound { from, to })?;
                log::debug!(
                    "edge key {key:?} unresolved for {from} → {to}; using first parallel edge (key {})",
                    self.graph.edge_key(first)
                );
                first
            }
        };
        self.edge_travel_secs[edge.index()] = secs;
        Ok(edge)
    }
}
