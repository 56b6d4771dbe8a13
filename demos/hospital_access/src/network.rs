//! Synthetic town used when no input files are given.
//!
//! A 6 × 6 street grid at 400 m spacing in projected metres.  The middle row
//! is a primary road, the middle column a secondary one, everything else
//! residential.  Two hospitals sit near opposite corners and a population
//! grid covers the town plus a strip of farmland east of it.

use std::sync::Arc;

use acc_core::XY;
use acc_engine::PointFeature;
use acc_io::PopulationGrid;
use acc_spatial::{EdgeAttrs, RoadGraph, RoadGraphBuilder, SpatialResult};

const SIDE:    usize = 6;
const SPACING: f64   = 400.0;

/// Build the street grid.  External node ids are `1000 + row * SIDE + col`.
pub fn build_town() -> SpatialResult<Arc<RoadGraph>> {
    let mut b = RoadGraphBuilder::with_capacity(SIDE * SIDE, 4 * SIDE * (SIDE - 1));

    let mut ids = Vec::with_capacity(SIDE * SIDE);
    for row in 0..SIDE {
        for col in 0..SIDE {
            let ext = 1000 + (row * SIDE + col) as i64;
            ids.push(b.add_node(ext, XY::new(col as f64 * SPACING, row as f64 * SPACING))?);
        }
    }

    let class_for = |row: usize, col: usize, horizontal: bool| -> &'static str {
        match (horizontal, row, col) {
            (true, r, _) if r == SIDE / 2 => "primary",
            (false, _, c) if c == SIDE / 2 => "secondary",
            _ => "residential",
        }
    };

    for row in 0..SIDE {
        for col in 0..SIDE {
            let here = ids[row * SIDE + col];
            if col + 1 < SIDE {
                let east = ids[row * SIDE + col + 1];
                b.add_road(here, east, EdgeAttrs::new(SPACING, class_for(row, col, true)))?;
            }
            if row + 1 < SIDE {
                let north = ids[(row + 1) * SIDE + col];
                b.add_road(here, north, EdgeAttrs::new(SPACING, class_for(row, col, false)))?;
            }
        }
    }

    Ok(Arc::new(b.build()))
}

pub fn hospitals() -> Vec<PointFeature> {
    vec![
        PointFeature::new(XY::new(150.0, 220.0)).with_label("District Hospital"),
        PointFeature::new(XY::new(1_850.0, 1_900.0)).with_label("Mission Clinic"),
    ]
}

/// 10 × 6 cells of 400 m; the four eastern columns lie beyond the street
/// grid and are sparsely populated.
pub fn population_grid() -> anyhow::Result<PopulationGrid> {
    let (ncols, nrows) = (10, 6);
    let values = (0..nrows)
        .flat_map(|row| {
            (0..ncols).map(move |col| {
                if col >= SIDE { 15.0 + (row * 3) as f64 } else { 120.0 + ((row + col) % 4) as f64 * 40.0 }
            })
        })
        .collect();
    let origin = XY::new(-SPACING / 2.0, -SPACING / 2.0);
    Ok(PopulationGrid::new(ncols, nrows, origin, SPACING, None, values)?)
}
