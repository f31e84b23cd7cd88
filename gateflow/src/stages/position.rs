//! Stage position resolution.
//!
//! Pure functions mapping a project's current stage to the status of any
//! viewed stage. No I/O, no side effects.

use serde::Serialize;

use super::catalog::{StageKey, STAGE_CATALOG};
use crate::core::StagePosition;
use crate::errors::Result;

/// Resolves the position of `stage` relative to `current`.
#[must_use]
pub fn resolve_position(stage: StageKey, current: StageKey) -> StagePosition {
    match stage.ordinal().cmp(&current.ordinal()) {
        std::cmp::Ordering::Less => StagePosition::Complete,
        std::cmp::Ordering::Equal => StagePosition::Active,
        std::cmp::Ordering::Greater => StagePosition::Locked,
    }
}

/// Resolves the position of the stage named `stage_key` for a project whose
/// current stage is `current_stage_key`.
///
/// Fails with `UnknownStageKind` if either key is not in the catalog.
pub fn resolve_status(stage_key: &str, current_stage_key: &str) -> Result<StagePosition> {
    let stage: StageKey = stage_key.parse()?;
    let current: StageKey = current_stage_key.parse()?;
    Ok(resolve_position(stage, current))
}

/// One row of a project's stage overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOverviewEntry {
    /// Stage key.
    pub key: StageKey,
    /// Human label.
    pub label: &'static str,
    /// Route slug.
    pub slug: Option<&'static str>,
    /// Position relative to the project's current stage.
    pub position: StagePosition,
}

/// Lists every catalog stage with its position relative to `current`.
#[must_use]
pub fn stage_overview(current: StageKey) -> Vec<StageOverviewEntry> {
    STAGE_CATALOG
        .iter()
        .map(|def| StageOverviewEntry {
            key: def.key,
            label: def.label,
            slug: def.slug,
            position: resolve_position(def.key, current),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_exactly_one_position_for_every_pair() {
        for stage in StageKey::ALL {
            for current in StageKey::ALL {
                let first = resolve_status(stage.as_str(), current.as_str()).unwrap();
                let second = resolve_status(stage.as_str(), current.as_str()).unwrap();
                assert_eq!(first, second);

                let expected = if stage.ordinal() < current.ordinal() {
                    StagePosition::Complete
                } else if stage == current {
                    StagePosition::Active
                } else {
                    StagePosition::Locked
                };
                assert_eq!(first, expected, "{stage} relative to {current}");
            }
        }
    }

    #[test]
    fn test_current_stage_is_active() {
        for key in StageKey::ALL {
            assert_eq!(
                resolve_status(key.as_str(), key.as_str()).unwrap(),
                StagePosition::Active
            );
        }
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = resolve_status("deploy", "discovery").unwrap_err();
        assert!(err.is(ErrorKind::UnknownStageKind));

        let err = resolve_status("discovery", "").unwrap_err();
        assert!(err.is(ErrorKind::UnknownStageKind));
    }

    #[test]
    fn test_overview_for_mapping() {
        let overview = stage_overview(StageKey::Mapping);
        assert_eq!(overview.len(), STAGE_CATALOG.len());
        assert_eq!(overview[0].position, StagePosition::Complete);
        assert_eq!(overview[4].key, StageKey::Mapping);
        assert_eq!(overview[4].position, StagePosition::Active);
        assert!(overview[5..]
            .iter()
            .all(|entry| entry.position == StagePosition::Locked));
    }
}
