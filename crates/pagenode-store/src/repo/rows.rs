//! Row mapping shared by the repository and hydration
//!
//! Timestamps are stored as microseconds since the Unix epoch; payload
//! content is stored as JSON text.

use chrono::{DateTime, Utc};
use pagenode_core::model::{
    Node, NodeId, NodeTranslation, Payload, PayloadId, TranslationId, Version, VersionId,
    VersionType,
};
use rusqlite::types::Type;
use rusqlite::Row;

pub const NODE_COLUMNS: &str = "id, parent_id, ref_type, deleted, created_at, updated_at";

pub const TRANSLATION_COLUMNS: &str = "id, node_id, locale, title, slug, online, \
     public_version_id, draft_version_id, created_at, updated_at";

pub const VERSION_COLUMNS: &str =
    "id, translation_id, version_type, payload_id, owner, origin_id, created_at, updated_at";

pub const PAYLOAD_COLUMNS: &str = "id, ref_type, title, structure_node, content";

pub fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

fn from_micros(idx: usize, micros: i64) -> rusqlite::Result<DateTime<Utc>> {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, micros))
}

pub fn node_from_row(row: &Row<'_>) -> rusqlite::Result<Node> {
    Ok(Node {
        id: NodeId(row.get(0)?),
        parent_id: row.get::<_, Option<u64>>(1)?.map(NodeId),
        ref_type: row.get(2)?,
        deleted: row.get(3)?,
        created_at: from_micros(4, row.get(4)?)?,
        updated_at: from_micros(5, row.get(5)?)?,
    })
}

pub fn translation_from_row(row: &Row<'_>) -> rusqlite::Result<NodeTranslation> {
    Ok(NodeTranslation {
        id: TranslationId(row.get(0)?),
        node_id: NodeId(row.get(1)?),
        locale: row.get(2)?,
        title: row.get(3)?,
        slug: row.get(4)?,
        online: row.get(5)?,
        public_version_id: row.get::<_, Option<u64>>(6)?.map(VersionId),
        draft_version_id: row.get::<_, Option<u64>>(7)?.map(VersionId),
        created_at: from_micros(8, row.get(8)?)?,
        updated_at: from_micros(9, row.get(9)?)?,
    })
}

pub fn version_from_row(row: &Row<'_>) -> rusqlite::Result<Version> {
    let tag: String = row.get(2)?;
    let version_type = VersionType::parse(&tag).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown version type '{}'", tag).into(),
        )
    })?;

    Ok(Version {
        id: VersionId(row.get(0)?),
        translation_id: TranslationId(row.get(1)?),
        version_type,
        payload_id: PayloadId(row.get(3)?),
        owner: row.get(4)?,
        origin_id: row.get::<_, Option<u64>>(5)?.map(VersionId),
        created_at: from_micros(6, row.get(6)?)?,
        updated_at: from_micros(7, row.get(7)?)?,
    })
}

pub fn payload_from_row(row: &Row<'_>) -> rusqlite::Result<Payload> {
    let content: String = row.get(4)?;
    let content = serde_json::from_str(&content)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Payload {
        id: PayloadId(row.get(0)?),
        ref_type: row.get(1)?,
        title: row.get(2)?,
        structure_node: row.get(3)?,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_micros_keep_sub_second_precision() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
            + chrono::Duration::microseconds(123_456);
        assert_eq!(from_micros(0, to_micros(at)).unwrap(), at);
    }

    #[test]
    fn test_pre_epoch_micros() {
        let at = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 59).unwrap()
            + chrono::Duration::microseconds(500_000);
        assert_eq!(from_micros(0, to_micros(at)).unwrap(), at);
    }
}
