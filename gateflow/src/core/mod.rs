//! Core domain model types for gateflow.
//!
//! This module contains the fundamental types used throughout the engine:
//! - Parties and the resolved caller identity
//! - Container, item, stage-position and build-component status enums
//! - Artifact types with their ownership rules
//! - The project record

mod artifact;
mod party;
mod project;
mod status;

pub use artifact::ArtifactType;
pub use party::{Caller, Party};
pub use project::{BuildComponent, BuildComponents, Project};
pub use status::{BuildComponentStatus, ContainerStatus, ItemState, StagePosition};
