//! CSV result writers.
//!
//! | Function                 | Columns                                              |
//! |--------------------------|------------------------------------------------------|
//! | [`write_node_times_csv`] | `node_id, x, y, travel_time_sec`                     |
//! | [`write_population_csv`] | `x, y, pop, travel_time_min`                         |
//! | [`write_summary_csv`]    | `threshold_min, percent, covered_weight, total_weight` |
//!
//! Missing values (no weight, undefined travel time) are written as empty
//! cells, never as 0.

use std::path::Path;

use csv::Writer;

use acc_engine::{AccessSummary, PopulationPoint, TravelTimes};
use acc_spatial::RoadGraph;

use crate::IoResult;

/// One row per reached node, ascending by internal id.  `node_id` is the
/// external id from the graph loader.
pub fn write_node_times_csv(path: &Path, graph: &RoadGraph, times: &TravelTimes) -> IoResult<()> {
    let mut w = Writer::from_path(path)?;
    w.write_record(["node_id", "x", "y", "travel_time_sec"])?;
    for (node, secs) in times.to_sorted_vec() {
        let pos = graph.node_pos(node);
        w.write_record(&[
            graph.node_ext_id(node).to_string(),
            pos.x.to_string(),
            pos.y.to_string(),
            secs.to_string(),
        ])?;
    }
    w.flush()?;
    log::debug!("{} node travel times written to {}", times.len(), path.display());
    Ok(())
}

/// One row per population point, in input order.
pub fn write_population_csv(path: &Path, points: &[PopulationPoint]) -> IoResult<()> {
    let mut w = Writer::from_path(path)?;
    w.write_record(["x", "y", "pop", "travel_time_min"])?;
    for p in points {
        w.write_record(&[
            p.pos.x.to_string(),
            p.pos.y.to_string(),
            opt(p.weight),
            opt(p.travel_time_min),
        ])?;
    }
    w.flush()?;
    log::debug!("{} population points written to {}", points.len(), path.display());
    Ok(())
}

/// One row per threshold, in summary order.
pub fn write_summary_csv(path: &Path, summary: &AccessSummary) -> IoResult<()> {
    let mut w = Writer::from_path(path)?;
    w.write_record(["threshold_min", "percent", "covered_weight", "total_weight"])?;
    for e in &summary.entries {
        w.write_record(&[
            e.threshold_min.to_string(),
            e.percent.to_string(),
            e.covered_weight.to_string(),
            summary.total_weight.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn opt(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}
