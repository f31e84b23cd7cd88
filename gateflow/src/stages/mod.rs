//! Delivery stages.
//!
//! - [`catalog`]: the static ordered stage catalog
//! - [`position`]: locked / active / complete resolution
//! - [`progression`]: admin moves of a project's stage pointer

pub mod catalog;
pub mod position;
mod progression;

pub use catalog::{catalog, routable_stages, StageDefinition, StageGuidance, StageKey, STAGE_CATALOG};
pub use position::{resolve_position, resolve_status, stage_overview, StageOverviewEntry};
pub use progression::StageProgressionController;

pub(crate) use progression::modify_project;
