//! `acc-io`: file formats around the accessibility engine.
//!
//! | Module     | Reads / writes                                              |
//! |------------|-------------------------------------------------------------|
//! | [`loader`] | node + edge CSVs → `RoadGraph`; point CSVs → `PointFeature` |
//! | [`grid`]   | ESRI ASCII population grids → `PopulationPoint`s, stats     |
//! | [`writer`] | node travel times, annotated population, coverage summary   |
//!
//! The engine itself never touches files; everything here converts between
//! files and its in-memory types.
//!
//! # Usage
//!
//! ```rust,ignore
//! use acc_io::{load_graph_csv, load_points_csv, PointColumns, PopulationGrid};
//!
//! let graph      = load_graph_csv(Path::new("nodes.csv"), Path::new("edges.csv"))?;
//! let facilities = load_points_csv(Path::new("hospitals.csv"), &PointColumns::default())?;
//! let population = PopulationGrid::from_path(Path::new("pop.asc"))?.to_points(0.0, 200_000);
//! ```

pub mod error;
pub mod grid;
pub mod loader;
pub mod writer;

#[cfg(test)]
mod tests;

pub use error::{IoError, IoResult};
pub use grid::{GridStats, PopulationGrid};
pub use loader::{
    PointColumns, load_graph_csv, load_graph_reader, load_points_csv, load_points_reader,
    parse_road_class,
};
pub use writer::{write_node_times_csv, write_population_csv, write_summary_csv};
