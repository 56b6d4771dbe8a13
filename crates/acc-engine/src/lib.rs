//! `acc-engine`: travel-time accessibility from facilities to population.
//!
//! # Pipeline
//!
//! ```text
//! AccessibilityEngine::new(graph, facilities, population)      Unweighted
//!   .assign_speeds_and_travel_time(&model)                     Weighted
//!   .snap_facilities()                  → FacilityNodes        (snapped)
//!   .compute_accessibility(cutoff)      → TravelTimes          (solved)
//!   .attach_travel_times(&times)        → Vec<PopulationPoint>
//! summarize(&points, &thresholds)       → AccessSummary
//! ```
//!
//! The graph is shared immutably (`Arc<RoadGraph>`); the engine's spatial
//! index is built once from it at construction and never goes stale.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use acc_engine::{AccessibilityEngine, summarize};
//! use acc_spatial::EdgeWeightModel;
//!
//! let engine = AccessibilityEngine::new(graph, facilities, population)?
//!     .assign_speeds_and_travel_time(&EdgeWeightModel::default())?;
//! let times  = engine.compute_accessibility(3600.0)?;
//! let points = engine.attach_travel_times(&times)?;
//! let stats  = summarize(&points, &[10.0, 20.0, 30.0, 60.0]);
//! ```

pub mod engine;
pub mod error;
pub mod points;
pub mod summary;


pub use engine::{AccessRun, AccessibilityEngine, FacilityNodes, TravelTimes, Unweighted, Weighted};
pub use error::{AccessError, AccessResult};
pub use points::{PointFeature, PopulationPoint};
pub use summary::{AccessSummary, ThresholdCoverage, summarize};
