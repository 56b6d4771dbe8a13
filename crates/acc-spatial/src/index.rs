//! Nearest-node lookup and point snapping.
//!
//! [`SpatialIndex`] is an R-tree (via `rstar`) over a fixed coordinate
//! array.  It answers "which input coordinate is nearest to this query?"
//! with the position in that array.  [`Snapper`] layers a node-id table and
//! a [`Projection`] on top so callers can go straight from point features to
//! graph nodes.
//!
//! Both are immutable once built.  The R-tree is bulk-loaded in
//! O(N log N); each query is O(log N).

use std::fmt;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use acc_core::{BBox, NodeId, XY};

use crate::network::RoadGraph;
use crate::{SpatialError, SpatialResult};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a 2-D `[x, y]` point with its position in the
/// source coordinate array.
#[derive(Clone)]
struct IndexEntry {
    point: [f64; 2],
    idx:   usize,
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexEntry {
    /// Squared Euclidean distance in projected metres.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

/// Nearest-neighbour index over a snapshot of coordinates.
pub struct SpatialIndex {
    tree: RTree<IndexEntry>,
}

impl SpatialIndex {
    /// Bulk-load an index over `coords`.
    ///
    /// # Errors
    ///
    /// [`SpatialError::EmptyInput`] for an empty slice,
    /// [`SpatialError::InvalidCoordinate`] for NaN/∞ components.
    pub fn build(coords: &[XY]) -> SpatialResult<Self> {
        if coords.is_empty() {
            return Err(SpatialError::EmptyInput("index coordinates"));
        }
        if let Some(index) = coords.iter().position(|p| !p.is_finite()) {
            return Err(SpatialError::InvalidCoordinate { index });
        }

        let entries: Vec<IndexEntry> = coords
            .iter()
            .enumerate()
            .map(|(idx, p)| IndexEntry { point: [p.x, p.y], idx })
            .collect();
        let tree = RTree::bulk_load(entries);
        log::debug!("spatial index built over {} coordinates", tree.size());
        Ok(Self { tree })
    }

    /// Number of indexed coordinates.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// For each query, the position (in the build-time coordinate slice) of
    /// its nearest coordinate.
    ///
    /// Ties are broken toward the lowest source position, so results are a
    /// pure function of the coordinates and never of tree layout.
    ///
    /// # Errors
    ///
    /// [`SpatialError::EmptyInput`] for an empty query slice,
    /// [`SpatialError::InvalidCoordinate`] for NaN/∞ query components.
    pub fn nearest(&self, queries: &[XY]) -> SpatialResult<Vec<usize>> {
        if queries.is_empty() {
            return Err(SpatialError::EmptyInput("query points"));
        }
        if let Some(index) = queries.iter().position(|p| !p.is_finite()) {
            return Err(SpatialError::InvalidCoordinate { index });
        }

        #[cfg(not(feature = "parallel"))]
        {
            Ok(queries.iter().map(|&q| self.nearest_one(q)).collect())
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            Ok(queries.par_iter().map(|&q| self.nearest_one(q)).collect())
        }
    }

    fn nearest_one(&self, q: XY) -> usize {
        let query = [q.x, q.y];
        let mut iter = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        // Non-empty by construction.
        let Some((first, best_d2)) = iter.next() else {
            return usize::MAX;
        };
        let mut best = first.idx;
        for (entry, d2) in iter {
            if d2 > best_d2 {
                break;
            }
            best = best.min(entry.idx);
        }
        best
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Maps point-feature coordinates into the graph's coordinate system.
///
/// Reprojection between reference systems belongs to the loaders; this seam
/// exists so callers can apply a known planar adjustment (unit change,
/// false-origin shift) at snap time without copying their point sets.
pub trait Projection: Send + Sync {
    fn project(&self, p: XY) -> XY;
}

/// Points are already in graph coordinates.
#[derive(Copy, Clone, Debug, Default)]
pub struct Identity;

impl Projection for Identity {
    #[inline]
    fn project(&self, p: XY) -> XY {
        p
    }
}

/// Axis-aligned scale and offset: `x' = x * scale_x + offset_x`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Affine {
    pub scale_x:  f64,
    pub scale_y:  f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Affine {
    pub fn translate(dx: f64, dy: f64) -> Self {
        Self { scale_x: 1.0, scale_y: 1.0, offset_x: dx, offset_y: dy }
    }

    pub fn scale(factor: f64) -> Self {
        Self { scale_x: factor, scale_y: factor, offset_x: 0.0, offset_y: 0.0 }
    }
}

impl Projection for Affine {
    #[inline]
    fn project(&self, p: XY) -> XY {
        XY::new(p.x * self.scale_x + self.offset_x, p.y * self.scale_y + self.offset_y)
    }
}

// ── Snapper ───────────────────────────────────────────────────────────────────

/// Snaps point features onto their nearest graph node.
pub struct Snapper {
    index:      SpatialIndex,
    node_ids:   Vec<NodeId>,
    extent:     BBox,
    projection: Box<dyn Projection>,
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex").field("len", &self.len()).finish()
    }
}

impl fmt::Debug for Snapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapper")
            .field("nodes", &self.node_ids.len())
            .field("extent", &self.extent)
            .finish_non_exhaustive()
    }
}

impl Snapper {
    /// Build from parallel coordinate and node-id arrays.
    pub fn new(node_coords: &[XY], node_ids: Vec<NodeId>) -> SpatialResult<Self> {
        if node_coords.len() != node_ids.len() {
            return Err(SpatialError::LengthMismatch {
                coords: node_coords.len(),
                ids:    node_ids.len(),
            });
        }
        let index = SpatialIndex::build(node_coords)?;
        let extent = BBox::from_points(node_coords.iter().copied())
            .ok_or(SpatialError::EmptyInput("index coordinates"))?;
        Ok(Self { index, node_ids, extent, projection: Box::new(Identity) })
    }

    /// Index every node of `graph`.
    pub fn for_graph(graph: &RoadGraph) -> SpatialResult<Self> {
        if graph.is_empty() {
            return Err(SpatialError::EmptyInput("road graph"));
        }
        Self::new(graph.node_coords(), graph.node_ids().collect())
    }

    /// Replace the default [`Identity`] projection.
    pub fn with_projection(mut self, projection: Box<dyn Projection>) -> Self {
        self.projection = projection;
        self
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Extent of the indexed node coordinates.
    pub fn extent(&self) -> BBox {
        self.extent
    }

    #[inline]
    pub fn project(&self, p: XY) -> XY {
        self.projection.project(p)
    }

    /// Nearest node for each point, after projecting into graph coordinates.
    pub fn snap_points_to_nodes(&self, points: &[XY]) -> SpatialResult<Vec<NodeId>> {
        let projected: Vec<XY> = points.iter().map(|&p| self.project(p)).collect();
        let idxs = self.index.nearest(&projected)?;
        Ok(idxs.into_iter().map(|i| self.node_ids[i]).collect())
    }

    /// Heuristic coordinate-system sanity check.
    ///
    /// Fails when the projected points' bounding box does not touch the
    /// graph's bounding box grown by its own larger side (at least 1 m).
    /// Non-finite points are ignored; no finite points passes trivially.
    pub fn check_extent(&self, points: &[XY]) -> SpatialResult<()> {
        let Some(points_bbox) = BBox::from_points(points.iter().map(|&p| self.project(p))) else {
            return Ok(());
        };
        let margin = self.extent.width().max(self.extent.height()).max(1.0);
        let allowed = self.extent.expand(margin);
        if allowed.intersects(&points_bbox) {
            Ok(())
        } else {
            Err(SpatialError::InconsistentCoordinateSystem {
                points: points_bbox,
                graph:  self.extent,
            })
        }
    }
}
