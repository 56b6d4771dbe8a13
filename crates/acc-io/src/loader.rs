//! CSV loaders for road graphs and point features.
//!
//! # Graph CSV format
//!
//! Two files.  Node ids are the caller's external ids (OSM ids fit).
//!
//! ```csv
//! id,x,y
//! 101,0.0,0.0
//! 102,100.0,0.0
//! ```
//!
//! ```csv
//! u,v,key,length,highway
//! 101,102,0,100.0,residential
//! 102,101,0,100.0,"['residential', 'tertiary']"
//! ```
//!
//! Each edge row is one *directed* edge.  `key` and `highway` are optional
//! columns; extra columns are ignored.
//!
//! **`highway`** field:
//!
//! | Value                        | Road class              |
//! |------------------------------|-------------------------|
//! | *(empty)*                    | missing → default speed |
//! | `primary`                    | `primary`               |
//! | `primary|secondary`          | `primary`               |
//! | `["primary", "secondary"]`   | `primary`               |
//!
//! An empty `length` is kept as missing; weighting later rejects it along
//! with every other malformed edge.
//!
//! # Point CSV format
//!
//! Any CSV with a header.  Coordinate columns are inferred from common names
//! unless set in [`PointColumns`]; an optional weight column (`pop`) and
//! label column (`name` / `NAME`) are picked up when present.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use acc_core::XY;
use acc_engine::PointFeature;
use acc_spatial::{EdgeAttrs, RawRoadClass, RoadClass, RoadGraph, RoadGraphBuilder};

use crate::{IoError, IoResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    id: i64,
    x:  f64,
    y:  f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    u:       i64,
    v:       i64,
    #[serde(default)]
    key:     Option<u32>,
    #[serde(default)]
    length:  Option<f64>,
    #[serde(default)]
    highway: Option<String>,
}

// ── Graph ─────────────────────────────────────────────────────────────────────

/// Load a road graph from a node CSV and an edge CSV.
pub fn load_graph_csv(nodes: &Path, edges: &Path) -> IoResult<RoadGraph> {
    let nodes = std::fs::File::open(nodes)?;
    let edges = std::fs::File::open(edges)?;
    load_graph_reader(nodes, edges)
}

/// Like [`load_graph_csv`] but accepts any `Read` sources.
pub fn load_graph_reader<N: Read, E: Read>(nodes: N, edges: E) -> IoResult<RoadGraph> {
    let mut builder = RoadGraphBuilder::new();

    // ── Nodes ─────────────────────────────────────────────────────────────
    let mut rdr = csv::Reader::from_reader(nodes);
    for (row, result) in rdr.deserialize::<NodeRecord>().enumerate() {
        let rec = result.map_err(|e| IoError::Parse(format!("node row {}: {e}", row + 1)))?;
        builder.add_node(rec.id, XY::new(rec.x, rec.y))?;
    }

    // ── Edges ─────────────────────────────────────────────────────────────
    let mut rdr = csv::Reader::from_reader(edges);
    let mut missing_class = 0usize;
    for (row, result) in rdr.deserialize::<EdgeRecord>().enumerate() {
        let rec = result.map_err(|e| IoError::Parse(format!("edge row {}: {e}", row + 1)))?;

        let from = lookup(&builder, rec.u, row)?;
        let to = lookup(&builder, rec.v, row)?;
        let road_class = parse_road_class(rec.highway.as_deref())?;
        if road_class.is_missing() {
            missing_class += 1;
        }
        let attrs = EdgeAttrs { length_m: rec.length, road_class };

        match rec.key {
            Some(key) => builder.add_edge(from, to, key, attrs)?,
            None => {
                builder.add_directed_edge(from, to, attrs)?;
            }
        }
    }

    let graph = builder.build();
    log::info!(
        "road graph loaded: {} nodes, {} edges ({missing_class} without road class)",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

fn lookup(builder: &RoadGraphBuilder, ext_id: i64, row: usize) -> IoResult<acc_core::NodeId> {
    builder.node_by_ext_id(ext_id).ok_or_else(|| {
        IoError::Parse(format!("edge row {}: unknown node id {ext_id}", row + 1))
    })
}

/// Normalize a raw `highway` cell.
///
/// Accepts an empty cell, a single class, a `|`-separated list, a JSON
/// array, or a bracketed list with single-quoted items.
pub fn parse_road_class(raw: Option<&str>) -> IoResult<RoadClass> {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(RoadClass::missing());
    };

    let raw = if let Some(inner) = s.strip_prefix('[') {
        match serde_json::from_str::<RawRoadClass>(s) {
            Ok(parsed) => parsed,
            Err(_) => {
                let inner = inner.strip_suffix(']').ok_or_else(|| {
                    IoError::Parse(format!("unterminated road-class list {s:?}"))
                })?;
                RawRoadClass::Many(
                    inner
                        .split(',')
                        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_owned())
                        .filter(|item| !item.is_empty())
                        .collect(),
                )
            }
        }
    } else if s.contains('|') {
        RawRoadClass::Many(s.split('|').map(str::to_owned).collect())
    } else {
        RawRoadClass::One(s.to_owned())
    };

    Ok(RoadClass::from_raw(Some(raw)))
}

// ── Points ────────────────────────────────────────────────────────────────────

const X_NAMES: [&str; 4] = ["x", "lon", "longitude", "lng"];
const Y_NAMES: [&str; 3] = ["y", "lat", "latitude"];
const LABEL_NAMES: [&str; 2] = ["NAME", "name"];

/// Column selection for [`load_points_csv`].  `None` means infer.
#[derive(Clone, Debug)]
pub struct PointColumns {
    pub x:      Option<String>,
    pub y:      Option<String>,
    /// Weight column; a missing column leaves every point unweighted.
    pub weight: String,
    pub label:  Option<String>,
}

impl Default for PointColumns {
    fn default() -> Self {
        Self { x: None, y: None, weight: "pop".into(), label: None }
    }
}

impl PointColumns {
    /// Explicit coordinate columns.
    pub fn xy(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self { x: Some(x.into()), y: Some(y.into()), ..Self::default() }
    }
}

struct ResolvedColumns {
    x:      usize,
    y:      usize,
    weight: Option<usize>,
    label:  Option<usize>,
}

/// Load point features from a CSV file.
pub fn load_points_csv(path: &Path, columns: &PointColumns) -> IoResult<Vec<PointFeature>> {
    let file = std::fs::File::open(path)?;
    load_points_reader(file, columns)
}

/// Like [`load_points_csv`] but accepts any `Read` source.
///
/// Empty coordinate cells become NaN so the engine can exclude and count
/// the point; text that is not a number is an error.
pub fn load_points_reader<R: Read>(reader: R, columns: &PointColumns) -> IoResult<Vec<PointFeature>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let cols = resolve_columns(&headers, columns)?;

    let mut points = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let x = parse_coord(field(cols.x), row, "x")?;
        let y = parse_coord(field(cols.y), row, "y")?;
        let weight = match cols.weight.map(field).filter(|s| !s.is_empty()) {
            Some(s) => Some(s.parse::<f64>().map_err(|_| {
                IoError::Parse(format!("row {}: weight {s:?} is not a number", row + 1))
            })?),
            None => None,
        };
        let label = cols.label.map(field).filter(|s| !s.is_empty()).map(str::to_owned);

        points.push(PointFeature { pos: XY::new(x, y), weight, label });
    }

    log::info!("{} points loaded", points.len());
    Ok(points)
}

fn resolve_columns(headers: &csv::StringRecord, columns: &PointColumns) -> IoResult<ResolvedColumns> {
    let exact = |name: &str| headers.iter().position(|h| h.trim() == name);
    let inferred = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
    };

    let x = match &columns.x {
        Some(name) => exact(name),
        None => inferred(&X_NAMES),
    };
    let y = match &columns.y {
        Some(name) => exact(name),
        None => inferred(&Y_NAMES),
    };
    let (Some(x), Some(y)) = (x, y) else {
        return Err(IoError::Parse(format!(
            "no coordinate columns found in header {:?}; name them explicitly",
            headers.iter().collect::<Vec<_>>()
        )));
    };

    let label = match &columns.label {
        Some(name) => exact(name),
        None => LABEL_NAMES.iter().find_map(|n| exact(n)),
    };

    Ok(ResolvedColumns { x, y, weight: exact(&columns.weight), label })
}

fn parse_coord(s: &str, row: usize, axis: &str) -> IoResult<f64> {
    if s.is_empty() {
        return Ok(f64::NAN);
    }
    s.parse::<f64>()
        .map_err(|_| IoError::Parse(format!("row {}: {axis} coordinate {s:?} is not a number", row + 1)))
}
