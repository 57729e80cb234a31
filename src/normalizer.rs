//! Media normalization.
//!
//! Maps both upstream record shapes onto [`NormalizedMediaItem`], keeping
//! only short-form video. Normalization is pure: same input, same output,
//! in the same order.

use chrono::DateTime;
use serde_json::Value;

use crate::types::{NormalizedMediaItem, RawMediaRecord};

/// Upstream timestamp layout, e.g. `2024-01-01T10:00:00+0000`.
const UPSTREAM_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Result of normalizing a raw listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Normalized {
    /// Video items in upstream order.
    pub items: Vec<NormalizedMediaItem>,
    /// Records that could not be ingested.
    pub skipped: usize,
    /// Well-formed records dropped because they are not video.
    pub dropped: usize,
}

/// Rewrite an upstream timestamp as RFC 3339.
///
/// Timestamps already in RFC 3339, or in no known layout, are returned
/// unchanged.
pub fn canonical_timestamp(raw: &str) -> String {
    if DateTime::parse_from_rfc3339(raw).is_ok() {
        return raw.to_string();
    }
    match DateTime::parse_from_str(raw, UPSTREAM_TIMESTAMP_FORMAT) {
        Ok(parsed) => parsed.to_rfc3339(),
        Err(_) => raw.to_string(),
    }
}

/// Normalize one record, or `None` if it is not short-form video.
pub fn normalize_record(record: &RawMediaRecord) -> Option<NormalizedMediaItem> {
    let media_type = record.kind().canonical()?;

    let item = match record {
        RawMediaRecord::Direct(r) => NormalizedMediaItem {
            id: r.id.clone(),
            caption: r.caption.clone().unwrap_or_default(),
            media_type,
            media_url: r.media_url.clone(),
            permalink: r.permalink.clone(),
            thumbnail_url: r.thumbnail_url.clone(),
            timestamp: canonical_timestamp(&r.timestamp),
            username: r.username.clone(),
        },
        RawMediaRecord::Linked(r) => NormalizedMediaItem {
            id: r.id.clone(),
            caption: r.caption.clone().unwrap_or_default(),
            media_type,
            media_url: r.media_url.clone(),
            permalink: r.permalink.clone(),
            thumbnail_url: r.thumbnail_url.clone(),
            timestamp: canonical_timestamp(&r.timestamp),
            username: r.username.clone(),
        },
    };

    Some(item)
}

/// Normalize decoded records, dropping anything that is not video.
pub fn normalize(records: &[RawMediaRecord]) -> Vec<NormalizedMediaItem> {
    records.iter().filter_map(normalize_record).collect()
}

/// Ingest and normalize a raw upstream listing.
///
/// Malformed records are skipped and counted, never propagated.
pub fn normalize_listing(values: &[Value]) -> Normalized {
    let mut out = Normalized::default();

    for value in values {
        let record = match RawMediaRecord::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed media record");
                out.skipped += 1;
                continue;
            }
        };

        match normalize_record(&record) {
            Some(item) => out.items.push(item),
            None => out.dropped += 1,
        }
    }

    out
}
