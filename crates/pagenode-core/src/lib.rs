//! pagenode core - content-versioning kernel for a page tree
//!
//! - Node, translation, version and payload models
//! - The [`VersioningEngine`] state machine over a translation's public and
//!   draft version slots
//! - Page administration operations and the `apply()` command boundary
//! - Collaborator traits: [`Repository`], [`Cloner`], [`EventSink`],
//!   [`Clock`], [`Authorizer`]
//! - Error and logging facilities shared by the store and CLI crates

pub mod apply;
pub mod clock;
pub mod cloner;
pub mod commands;
pub mod config;
pub mod errors;
pub mod events;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod policy;
pub mod rules;
pub mod traversal;
pub mod versioning;

/// Re-exported for the logging macros
pub use pagenode_core_types as core_types;

pub use apply::apply;
pub use clock::{Clock, ManualClock, SystemClock};
pub use cloner::{Cloner, DeepCloner};
pub use commands::{Command, CommandOutcome};
pub use config::EngineConfig;
pub use errors::{ExError, ExErrorKind, PageNodeError, Result};
pub use events::{EventSink, NodeEvent, NodeEventKind};
pub use model::{
    Node, NodeId, NodeTranslation, Payload, PayloadId, TranslationId, Version, VersionId,
    VersionType,
};
pub use ops::{ChangeSet, Repository, Store};
pub use policy::{AllowAllAuthorizer, Authorizer, DenyAllAuthorizer, Permission};
pub use versioning::{ActiveVersion, VersionState, VersioningEngine};
