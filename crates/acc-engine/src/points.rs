//! Point features placed on the road graph.

use acc_core::{NodeId, XY};

/// A located feature with an optional weight: a facility, or a population
/// sample before travel times are attached.
#[derive(Clone, Debug, PartialEq)]
pub struct PointFeature {
    pub pos:    XY,
    /// Population count or other weight; `None` means unweighted.
    pub weight: Option<f64>,
    /// Free-text label (facility name).
    pub label:  Option<String>,
}

impl PointFeature {
    pub fn new(pos: XY) -> Self {
        Self { pos, weight: None, label: None }
    }

    pub fn weighted(pos: XY, weight: f64) -> Self {
        Self { pos, weight: Some(weight), label: None }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A population sample and, once attached, its travel time to the nearest
/// facility.
#[derive(Clone, Debug, PartialEq)]
pub struct PopulationPoint {
    pub pos:    XY,
    pub weight: Option<f64>,
    /// Node the point snapped to; `None` before attachment or when the
    /// position could not be snapped.
    pub node:   Option<NodeId>,
    /// Minutes to the nearest facility.  `None` is the explicit "undefined"
    /// marker: not yet computed, or unreachable within the cutoff.  It is
    /// never replaced by zero or any other number.
    pub travel_time_min: Option<f64>,
}

impl PopulationPoint {
    pub fn new(pos: XY, weight: Option<f64>) -> Self {
        Self { pos, weight, node: None, travel_time_min: None }
    }

    /// `true` when a travel time is defined and no greater than `threshold_min`.
    #[inline]
    pub fn within(&self, threshold_min: f64) -> bool {
        self.travel_time_min.is_some_and(|t| t <= threshold_min)
    }
}

impl From<PointFeature> for PopulationPoint {
    fn from(f: PointFeature) -> Self {
        Self::new(f.pos, f.weight)
    }
}
