//! Test assertions for engine results.

use std::fmt::Debug;

use crate::core::ItemState;
use crate::errors::{ErrorKind, GateflowError};
use crate::workflow::WorkflowItem;

/// Asserts that `result` failed with `kind`.
pub fn assert_error_kind<T: Debug>(result: &Result<T, GateflowError>, kind: ErrorKind) {
    match result {
        Ok(value) => panic!("Expected {kind:?} error, got Ok({value:?})"),
        Err(err) => assert!(
            err.is(kind),
            "Expected {kind:?} error, got {:?}: {}",
            err.kind,
            err.message
        ),
    }
}

/// Asserts the derived state of the item with `id`.
pub fn assert_item_state(items: &[WorkflowItem], id: &str, expected: ItemState) {
    let item = items
        .iter()
        .find(|i| i.id == id)
        .unwrap_or_else(|| panic!("No item '{id}' among {:?}", items.iter().map(|i| &i.id).collect::<Vec<_>>()));
    assert_eq!(
        item.state(),
        expected,
        "Expected item '{id}' to be {expected:?}, got {:?}",
        item.state()
    );
}

/// Asserts that an `IncompleteItems` error lists exactly `expected`.
pub fn assert_outstanding(err: &GateflowError, expected: &[&str]) {
    assert!(
        err.is(ErrorKind::IncompleteItems),
        "Expected IncompleteItems, got {:?}",
        err.kind
    );
    let mut actual: Vec<&str> = err.outstanding.iter().map(String::as_str).collect();
    let mut wanted = expected.to_vec();
    actual.sort_unstable();
    wanted.sort_unstable();
    assert_eq!(actual, wanted);
}
