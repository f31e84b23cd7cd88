//! Testing utilities for gateflow embedders.
//!
//! This module provides:
//! - A seeded portal with one project and a user per party
//! - Recording and failing notification dispatchers
//! - A store wrapper that injects version conflicts
//! - Assertions for engine errors and item states

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_error_kind, assert_item_state, assert_outstanding};
pub use fixtures::{TestPortal, TEST_CLIENT_ID, TEST_PROJECT_NAME};
pub use mocks::{CollectingDispatcher, FaultInjectingStore, FailingDispatcher};
