//! Run configuration.
//!
//! Typically loaded from a TOML file by the application crate and passed to
//! the engine:
//!
//! ```toml
//! cutoff_secs    = 3600
//! thresholds_min = [10, 20, 30, 60]
//!
//! [speeds]
//! default_kph = 30
//!
//! [speeds.classes]
//! motorway    = 80
//! residential = 25
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.
//! A `[speeds.classes]` table replaces the built-in table wholesale; it is
//! not merged with it.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{CoreError, CoreResult};

// ── SpeedTable ────────────────────────────────────────────────────────────────

/// Road-class → assumed travel speed (km/h), with a fallback for classes
/// that are missing or not listed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeedTable {
    /// Speed used for unknown or missing road classes.
    pub default_kph: f64,
    /// Per-class speeds keyed by the canonical road-class tag
    /// (e.g. the OSM `highway` value).
    pub classes: BTreeMap<String, f64>,
}

impl SpeedTable {
    /// Built-in urban defaults for OSM `highway` classes, 30 km/h fallback.
    pub fn urban_defaults() -> Self {
        let classes = [
            ("motorway",       80.0),
            ("motorway_link",  60.0),
            ("trunk",          60.0),
            ("trunk_link",     50.0),
            ("primary",        50.0),
            ("primary_link",   40.0),
            ("secondary",      40.0),
            ("secondary_link", 35.0),
            ("tertiary",       35.0),
            ("tertiary_link",  30.0),
            ("residential",    25.0),
            ("living_street",  20.0),
            ("unclassified",   20.0),
            ("service",        15.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();

        Self { default_kph: 30.0, classes }
    }

    /// A table with no per-class entries: every edge moves at `default_kph`.
    pub fn uniform(default_kph: f64) -> Self {
        Self { default_kph, classes: BTreeMap::new() }
    }

    /// Add or replace one class speed (builder style).
    pub fn with_class(mut self, class: impl Into<String>, kph: f64) -> Self {
        self.classes.insert(class.into(), kph);
        self
    }

    /// Speed for `class`, falling back to `default_kph`.
    pub fn speed_kph(&self, class: Option<&str>) -> f64 {
        class
            .and_then(|c| self.classes.get(c).copied())
            .unwrap_or(self.default_kph)
    }

    /// Every speed (default included) must be finite and strictly positive.
    pub fn validate(&self) -> CoreResult<()> {
        if !is_valid_speed(self.default_kph) {
            return Err(CoreError::Config(format!(
                "default speed must be finite and > 0 km/h, got {}",
                self.default_kph
            )));
        }
        for (class, &kph) in &self.classes {
            if !is_valid_speed(kph) {
                return Err(CoreError::Config(format!(
                    "speed for road class {class:?} must be finite and > 0 km/h, got {kph}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self::urban_defaults()
    }
}

#[inline]
fn is_valid_speed(kph: f64) -> bool {
    kph.is_finite() && kph > 0.0
}

// ── AccessConfig ──────────────────────────────────────────────────────────────

/// Top-level configuration for one accessibility run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessConfig {
    /// Edge speed model.
    pub speeds: SpeedTable,

    /// Shortest-path cutoff in seconds.  Nodes farther than this from every
    /// facility are reported as unreachable.  Default: 3600.
    pub cutoff_secs: f64,

    /// Coverage thresholds in minutes, evaluated independently.
    pub thresholds_min: Vec<f64>,

    /// Reject point sets whose extent does not overlap the road graph.
    pub check_extent: bool,

    /// Population grid cells must exceed this value to become points.
    pub grid_threshold: f64,

    /// Upper bound on grid-derived population points (uniform thinning
    /// above it).
    pub max_points: usize,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            speeds:         SpeedTable::default(),
            cutoff_secs:    3600.0,
            thresholds_min: vec![10.0, 20.0, 30.0, 60.0],
            check_extent:   true,
            grid_threshold: 0.0,
            max_points:     200_000,
        }
    }
}

impl AccessConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> CoreResult<Self> {
        let cfg: AccessConfig = toml::from_str(s).map_err(|e| CoreError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: &std::path::Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.speeds.validate()?;

        if !self.cutoff_secs.is_finite() || self.cutoff_secs < 0.0 {
            return Err(CoreError::Config(format!(
                "cutoff_secs must be finite and >= 0, got {}",
                self.cutoff_secs
            )));
        }
        if let Some(t) = self.thresholds_min.iter().find(|t| !t.is_finite()) {
            return Err(CoreError::Config(format!("threshold {t} is not finite")));
        }
        if self.max_points == 0 {
            return Err(CoreError::Config("max_points must be at least 1".into()));
        }
        Ok(())
    }
}
