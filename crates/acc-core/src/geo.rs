//! Planar coordinate types.
//!
//! Everything downstream of the loaders works in a projected, metric
//! coordinate system: `x`/`y` are metres and distances are Euclidean.
//! Reprojection from geographic coordinates is the caller's job.

/// A projected 2-D coordinate in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XY {
    pub x: f64,
    pub y: f64,
}

impl XY {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `true` when both components are finite (not NaN or ±∞).
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Squared Euclidean distance.  Cheaper than [`distance`](Self::distance)
    /// and order-preserving, so nearest-neighbour code compares on this.
    #[inline]
    pub fn distance_2(self, other: XY) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: XY) -> f64 {
        self.distance_2(other).sqrt()
    }
}

impl From<(f64, f64)> for XY {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for XY {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── BBox ──────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub min: XY,
    pub max: XY,
}

impl BBox {
    /// Smallest box containing every finite point, or `None` if there are
    /// no finite points.
    pub fn from_points<I>(points: I) -> Option<BBox>
    where
        I: IntoIterator<Item = XY>,
    {
        let mut it = points.into_iter().filter(|p| p.is_finite());
        let first = it.next()?;
        let mut bbox = BBox { min: first, max: first };
        for p in it {
            bbox.min.x = bbox.min.x.min(p.x);
            bbox.min.y = bbox.min.y.min(p.y);
            bbox.max.x = bbox.max.x.max(p.x);
            bbox.max.y = bbox.max.y.max(p.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Grow the box by `margin` on every side.
    pub fn expand(self, margin: f64) -> BBox {
        BBox {
            min: XY::new(self.min.x - margin, self.min.y - margin),
            max: XY::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// Closed-interval overlap test (touching boxes intersect).
    pub fn intersects(&self, other: &BBox) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    #[inline]
    pub fn contains(&self, p: XY) -> bool {
        (self.min.x..=self.max.x).contains(&p.x) && (self.min.y..=self.max.y).contains(&p.y)
    }
}

impl std::fmt::Display for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} .. {}]", self.min, self.max)
    }
}
