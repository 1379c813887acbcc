use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{PayloadId, TranslationId, VersionId};

/// Role tag of a version record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    Public,
    Draft,
}

impl VersionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionType::Public => "public",
            VersionType::Draft => "draft",
        }
    }

    /// Parse the stored tag
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(VersionType::Public),
            "draft" => Some(VersionType::Draft),
            _ => None,
        }
    }
}

impl std::fmt::Display for VersionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version - a snapshot pointer plus bookkeeping
///
/// The referenced payload is the snapshot. `created_at` is the ancestry edit
/// time used for history ordering; `updated_at` is the last commit time and
/// drives staleness checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: VersionId,
    pub translation_id: TranslationId,
    pub version_type: VersionType,
    pub payload_id: PayloadId,

    /// User that created the version
    pub owner: String,

    /// Version this one was derived from
    pub origin_id: Option<VersionId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Version {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: VersionId,
        translation_id: TranslationId,
        version_type: VersionType,
        payload_id: PayloadId,
        owner: impl Into<String>,
        origin_id: Option<VersionId>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            translation_id,
            version_type,
            payload_id,
            owner: owner.into(),
            origin_id,
            created_at,
            updated_at,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.version_type == VersionType::Draft
    }
}
