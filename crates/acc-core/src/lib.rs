//! `acc-core`: foundational types for the accessibility workspace.
//!
//! This crate is a dependency of every other `acc-*` crate.  It has no
//! `acc-*` dependencies and few external ones (`thiserror`, `serde`, `toml`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`                                    |
//! | [`geo`]         | `XY` (projected metres), `BBox`                       |
//! | [`config`]      | `AccessConfig`, `SpeedTable`                          |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids and geometry types.  |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AccessConfig, SpeedTable};
pub use error::{CoreError, CoreResult};
pub use geo::{BBox, XY};
pub use ids::{EdgeId, NodeId};
