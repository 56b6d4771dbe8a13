//! Population coverage at travel-time thresholds.
//!
//! # Weighting
//!
//! If any point carries a weight the summary is population-weighted and
//! points without a weight contribute 0.  Otherwise every point counts 1.
//! Negative and non-finite weights contribute 0, so percentages stay within
//! 0 to 100 and never decrease as the threshold grows.
//!
//! Points with an undefined travel time stay in the denominator and never
//! enter a numerator.  A zero denominator yields 0 % everywhere.

use crate::points::PopulationPoint;

/// Coverage at one threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdCoverage {
    pub threshold_min:  f64,
    /// 0 to 100.
    pub percent:        f64,
    pub covered_weight: f64,
}

/// Result of [`summarize`].  Entries follow the caller's threshold order,
/// duplicates included.
#[derive(Clone, Debug, PartialEq)]
pub struct AccessSummary {
    pub entries:        Vec<ThresholdCoverage>,
    /// `true` when the denominator is a weight sum rather than a count.
    pub weighted:       bool,
    pub total_weight:   f64,
    /// Weight of points with any defined travel time.
    pub reached_weight: f64,
    /// Weighted mean travel time over reached points.
    pub mean_travel_time_min: Option<f64>,
}

impl AccessSummary {
    /// Percentage for the first entry whose threshold equals `threshold_min`.
    pub fn percent_at(&self, threshold_min: f64) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.threshold_min == threshold_min)
            .map(|e| e.percent)
    }

    /// Weight whose travel time is undefined.
    pub fn unreached_weight(&self) -> f64 {
        self.total_weight - self.reached_weight
    }

    /// `(threshold_min, percent)` pairs.
    pub fn percentages(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.entries.iter().map(|e| (e.threshold_min, e.percent))
    }
}

/// Share of population within each threshold (minutes), evaluated
/// independently per threshold.
pub fn summarize(points: &[PopulationPoint], thresholds_min: &[f64]) -> AccessSummary {
    let weighted = points.iter().any(|p| p.weight.is_some());
    let weight_of = |p: &PopulationPoint| -> f64 {
        if weighted {
            p.weight.filter(|w| w.is_finite() && *w > 0.0).unwrap_or(0.0)
        } else {
            1.0
        }
    };

    let total_weight: f64 = points.iter().map(weight_of).sum();

    let mut reached_weight = 0.0;
    let mut time_weight_sum = 0.0;
    for p in points {
        if let Some(t) = p.travel_time_min {
            let w = weight_of(p);
            reached_weight += w;
            time_weight_sum += w * t;
        }
    }

    let entries = thresholds_min
        .iter()
        .map(|&threshold_min| {
            let covered_weight: f64 = points
                .iter()
                .filter(|p| p.within(threshold_min))
                .map(weight_of)
                .sum();
            ThresholdCoverage {
                threshold_min,
                percent: percent(covered_weight, total_weight),
                covered_weight,
            }
        })
        .collect();

    let mean_travel_time_min = (reached_weight > 0.0).then(|| time_weight_sum / reached_weight);

    AccessSummary { entries, weighted, total_weight, reached_weight, mean_travel_time_min }
}

#[inline]
fn percent(part: f64, total: f64) -> f64 {
    if total > 0.0 { 100.0 * part / total } else { 0.0 }
}
