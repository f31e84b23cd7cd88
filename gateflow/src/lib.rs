//! # Gateflow
//!
//! A stage-gated workflow engine for two-party client implementation
//! projects.
//!
//! A project moves through an ordered catalog of delivery stages. Each
//! stage carries a workflow artifact owned by one party and reviewed by the
//! other:
//!
//! - **Single-party review**: `active -> submitted -> approved`, with a
//!   "changes requested" edge back to `active`
//! - **Per-item verification**: provisioning steps completed by the client
//!   and verified by an admin
//! - **Two-party checklist**: go-live items split between the parties,
//!   frozen once go-live is triggered
//!
//! Every state change is committed with an optimistic version check and
//! then announced to the other party through a [`NotificationDispatcher`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gateflow::prelude::*;
//!
//! let engine = WorkflowEngine::new(store, Arc::new(LoggingDispatcher));
//!
//! engine
//!     .initialize(&admin, "project-1", InitializeRequest::BobConfig { items: None })
//!     .await?;
//! engine.submit(&client, "project-1", ArtifactType::BobConfig).await?;
//! engine
//!     .approve(&admin, "project-1", ArtifactType::BobConfig, None)
//!     .await?;
//! ```
//!
//! [`NotificationDispatcher`]: notifications::NotificationDispatcher

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod engine;
pub mod errors;
pub mod events;
pub mod notifications;
pub mod observability;
pub mod stages;
pub mod store;
pub mod testing;
pub mod utils;
pub mod workflow;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{EngineConfig, GateflowConfig, LoggingConfig};
    pub use crate::core::{
        ArtifactType, BuildComponent, BuildComponentStatus, Caller, ContainerStatus, ItemState,
        Party, Project, StagePosition,
    };
    pub use crate::engine::{GoLiveOutcome, GoLiveView, ProvisioningView, WorkflowEngine};
    pub use crate::errors::{ErrorCategory, ErrorKind, GateflowError, Result};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::notifications::{
        LoggingDispatcher, NoOpDispatcher, NotificationDispatcher, NotificationKind,
        NotificationRecord,
    };
    pub use crate::stages::{resolve_status, StageKey, StageProgressionController};
    pub use crate::store::{InMemoryStore, WorkflowStore};
    pub use crate::workflow::{
        ContainerAction, ContainerMutation, ContainerView, InitializeRequest, ItemTemplate,
        WorkflowContainer, WorkflowItem,
    };
}
