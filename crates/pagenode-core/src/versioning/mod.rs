//! Content-versioning state machine
//!
//! Each translation holds a public slot and an optional draft slot:
//!
//! ```text
//!             materialize_draft / revert
//! PublicOnly ----------------------------> DraftPending
//!     ^                                        |
//!     +---- promote_to_public(draft) ----------+
//! ```
//!
//! `online` is orthogonal and only changes through `set_online` or
//! `promote_to_public(publish = true)`.

mod engine;

pub use engine::VersioningEngine;

use crate::model::{NodeTranslation, Version};

/// Slot configuration of a translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionState {
    /// Draft slot empty
    PublicOnly,
    /// Draft slot set, distinct from the public slot
    DraftPending,
}

impl VersionState {
    pub fn of(translation: &NodeTranslation) -> Self {
        if translation.has_draft() {
            VersionState::DraftPending
        } else {
            VersionState::PublicOnly
        }
    }
}

/// Version chosen by `resolve_active_version`
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveVersion {
    pub version: Version,
    /// True when the draft branch was taken
    pub draft: bool,
}
