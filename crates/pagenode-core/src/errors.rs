use pagenode_core_types::{RequestId, TraceId};
use thiserror::Error;

use crate::model::{NodeId, PayloadId, TranslationId, VersionId};

/// Result type alias using PageNodeError
pub type Result<T> = std::result::Result<T, PageNodeError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Stable classification of every error the workspace can produce. Each kind
/// maps to a stable code used by the CLI, by log lines and by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Caller input
    InvalidArgument,
    InvalidTitle,
    Config,

    // Lookup
    NotFound,
    Deleted,
    AlreadyExists,

    // State assumed never to occur
    InvariantViolation,

    // Authorization / extension-point veto
    PermissionDenied,
    PolicyDenied,

    // Integration
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidArgument => "ERR_INVALID_ARGUMENT",
            ExErrorKind::InvalidTitle => "ERR_INVALID_TITLE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Deleted => "ERR_DELETED",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::PermissionDenied => "ERR_PERMISSION_DENIED",
            ExErrorKind::PolicyDenied => "ERR_POLICY_DENIED",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification plus whatever entity context was known at the
/// failure site. The store crate returns this type directly; core code
/// returns [`PageNodeError`] which converts into it.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    node_id: Option<NodeId>,
    translation_id: Option<TranslationId>,
    version_id: Option<VersionId>,
    locale: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            node_id: None,
            translation_id: None,
            version_id: None,
            locale: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_node_id(mut self, id: NodeId) -> Self {
        self.node_id = Some(id);
        self
    }

    pub fn with_translation_id(mut self, id: TranslationId) -> Self {
        self.translation_id = Some(id);
        self
    }

    pub fn with_version_id(mut self, id: VersionId) -> Self {
        self.version_id = Some(id);
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn node_id(&self) -> Option<NodeId> {
        self.node_id
    }

    pub fn translation_id(&self) -> Option<TranslationId> {
        self.translation_id
    }

    pub fn version_id(&self) -> Option<VersionId> {
        self.version_id
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(node_id) = self.node_id {
            write!(f, " (node_id: {})", node_id)?;
        }
        if let Some(translation_id) = self.translation_id {
            write!(f, " (translation_id: {})", translation_id)?;
        }
        if let Some(version_id) = self.version_id {
            write!(f, " (version_id: {})", version_id)?;
        }
        if let Some(locale) = &self.locale {
            write!(f, " (locale: {})", locale)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for node administration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageNodeError {
    // ===== Caller input =====
    /// Revert was requested without a version identifier
    #[error("No version specified")]
    MissingVersionId,

    /// Version identifier is not a number
    #[error("Invalid version identifier: {raw:?}")]
    InvalidVersionId { raw: String },

    /// Version exists but belongs to a different translation
    #[error("Version {version_id} does not belong to translation {translation_id}")]
    VersionNotInTranslation {
        version_id: VersionId,
        translation_id: TranslationId,
    },

    /// Invalid title (used where a title is mandatory)
    #[error("Invalid title: {reason}")]
    InvalidTitle { reason: String },

    /// Locale is empty or malformed
    #[error("Invalid locale: {locale:?}")]
    InvalidLocale { locale: String },

    /// Configuration could not be parsed or holds invalid values
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // ===== Lookup =====
    #[error("Node not found: {node_id}")]
    NodeNotFound { node_id: NodeId },

    /// Node was soft-deleted
    #[error("Node was deleted: {node_id}")]
    NodeDeleted { node_id: NodeId },

    #[error("Translation not found: {translation_id}")]
    TranslationNotFound { translation_id: TranslationId },

    /// Node has no translation for the requested locale
    #[error("Node {node_id} has no translation for locale {locale}")]
    NoTranslationForLocale { node_id: NodeId, locale: String },

    #[error("Version does not exist: {version_id}")]
    VersionNotFound { version_id: VersionId },

    #[error("Payload not found: {payload_id}")]
    PayloadNotFound { payload_id: PayloadId },

    /// Translation for (node, locale) already exists
    #[error("Node {node_id} already has a translation for locale {locale}")]
    TranslationAlreadyExists { node_id: NodeId, locale: String },

    // ===== Invariant violations =====
    /// Translation has no public version (never valid)
    #[error("Translation {translation_id} has no public version")]
    MissingPublicVersion { translation_id: TranslationId },

    /// Translation slot points at a version of another translation
    #[error("Translation {translation_id} slot references foreign version {version_id}")]
    SlotReferencesForeignVersion {
        translation_id: TranslationId,
        version_id: VersionId,
    },

    /// Draft slot and public slot point at the same version
    #[error("Translation {translation_id} uses version {version_id} as both public and draft")]
    DraftEqualsPublic {
        translation_id: TranslationId,
        version_id: VersionId,
    },

    /// Origin chain loops or points forward in time
    #[error("Origin chain of version {version_id} is not a DAG")]
    OriginChainBroken { version_id: VersionId },

    /// Parent chain loops back onto itself
    #[error("Cycle detected in node tree at node {node_id}")]
    NodeCycle { node_id: NodeId },

    /// Parent pointer references a node that does not exist
    #[error("Parent chain broken at node {node_id}")]
    ParentChainBroken { node_id: NodeId },

    // ===== Authorization / veto =====
    /// Raised by the authorization collaborator
    #[error("Permission {permission} denied on node {node_id}")]
    PermissionDenied { permission: String, node_id: NodeId },

    /// An event sink vetoed a pre-event
    #[error("Event {event} vetoed: {reason}")]
    EventVetoed { event: String, reason: String },

    // ===== Generic =====
    /// Persistence failure reported by a repository implementation
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Serialization error (JSON/TOML encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PageNodeError {
    /// Canonical kind of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            PageNodeError::MissingVersionId
            | PageNodeError::InvalidVersionId { .. }
            | PageNodeError::VersionNotInTranslation { .. }
            | PageNodeError::InvalidLocale { .. } => ExErrorKind::InvalidArgument,
            PageNodeError::InvalidTitle { .. } => ExErrorKind::InvalidTitle,
            PageNodeError::InvalidConfig { .. } => ExErrorKind::Config,
            PageNodeError::NodeNotFound { .. }
            | PageNodeError::TranslationNotFound { .. }
            | PageNodeError::NoTranslationForLocale { .. }
            | PageNodeError::VersionNotFound { .. }
            | PageNodeError::PayloadNotFound { .. } => ExErrorKind::NotFound,
            PageNodeError::NodeDeleted { .. } => ExErrorKind::Deleted,
            PageNodeError::TranslationAlreadyExists { .. } => ExErrorKind::AlreadyExists,
            PageNodeError::MissingPublicVersion { .. }
            | PageNodeError::SlotReferencesForeignVersion { .. }
            | PageNodeError::DraftEqualsPublic { .. }
            | PageNodeError::OriginChainBroken { .. }
            | PageNodeError::NodeCycle { .. }
            | PageNodeError::ParentChainBroken { .. } => ExErrorKind::InvariantViolation,
            PageNodeError::PermissionDenied { .. } => ExErrorKind::PermissionDenied,
            PageNodeError::EventVetoed { .. } => ExErrorKind::PolicyDenied,
            PageNodeError::Persistence { .. } => ExErrorKind::Persistence,
            PageNodeError::Serialization { .. } => ExErrorKind::Serialization,
            PageNodeError::Internal { .. } => ExErrorKind::Internal,
        }
    }
}

/// Conversion from PageNodeError to ExError
///
/// Keeps the variant's entity ids as structured context and its display text
/// as the message.
impl From<PageNodeError> for ExError {
    fn from(err: PageNodeError) -> Self {
        let base = ExError::new(err.kind()).with_message(err.to_string());
        match err {
            PageNodeError::VersionNotInTranslation {
                version_id,
                translation_id,
            }
            | PageNodeError::SlotReferencesForeignVersion {
                translation_id,
                version_id,
            }
            | PageNodeError::DraftEqualsPublic {
                translation_id,
                version_id,
            } => base
                .with_version_id(version_id)
                .with_translation_id(translation_id),

            PageNodeError::NodeNotFound { node_id }
            | PageNodeError::NodeDeleted { node_id }
            | PageNodeError::NodeCycle { node_id }
            | PageNodeError::ParentChainBroken { node_id }
            | PageNodeError::PermissionDenied { node_id, .. } => base.with_node_id(node_id),

            PageNodeError::NoTranslationForLocale { node_id, locale }
            | PageNodeError::TranslationAlreadyExists { node_id, locale } => {
                base.with_node_id(node_id).with_locale(locale)
            }

            PageNodeError::InvalidLocale { locale } => base.with_locale(locale),

            PageNodeError::TranslationNotFound { translation_id }
            | PageNodeError::MissingPublicVersion { translation_id } => {
                base.with_translation_id(translation_id)
            }

            PageNodeError::VersionNotFound { version_id }
            | PageNodeError::OriginChainBroken { version_id } => base.with_version_id(version_id),

            PageNodeError::MissingVersionId
            | PageNodeError::InvalidVersionId { .. }
            | PageNodeError::InvalidTitle { .. }
            | PageNodeError::InvalidConfig { .. }
            | PageNodeError::PayloadNotFound { .. }
            | PageNodeError::EventVetoed { .. }
            | PageNodeError::Persistence { .. }
            | PageNodeError::Serialization { .. }
            | PageNodeError::Internal { .. } => base,
        }
    }
}

/// Repository implementations outside this crate report failures as
/// `ExError`; fold them back into the domain taxonomy.
impl From<ExError> for PageNodeError {
    fn from(err: ExError) -> Self {
        match err.kind() {
            ExErrorKind::Serialization => PageNodeError::Serialization {
                message: err.to_string(),
            },
            ExErrorKind::Internal => PageNodeError::Internal {
                message: err.to_string(),
            },
            _ => PageNodeError::Persistence {
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_version_id_is_invalid_argument() {
        let err = PageNodeError::InvalidVersionId {
            raw: "abc".to_string(),
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::InvalidArgument);
        assert_eq!(ex.code(), "ERR_INVALID_ARGUMENT");
        assert!(ex.message().contains("abc"));
    }

    #[test]
    fn test_missing_public_version_is_invariant_violation() {
        let err = PageNodeError::MissingPublicVersion {
            translation_id: TranslationId(7),
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::InvariantViolation);
        assert_eq!(ex.translation_id(), Some(TranslationId(7)));
    }

    #[test]
    fn test_display_includes_context() {
        let ex = ExError::new(ExErrorKind::NotFound)
            .with_op("revert")
            .with_version_id(VersionId(999_999))
            .with_message("Version does not exist");
        let text = ex.to_string();
        assert!(text.starts_with("[ERR_NOT_FOUND]"));
        assert!(text.contains("in operation 'revert'"));
        assert!(text.contains("version_id: 999999"));
    }

    #[test]
    fn test_ex_error_folds_back_into_persistence() {
        let ex = ExError::new(ExErrorKind::Persistence).with_message("disk full");
        let err: PageNodeError = ex.into();
        assert!(matches!(err, PageNodeError::Persistence { .. }));
    }
}
