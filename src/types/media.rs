//! Media record types.
//!
//! Upstream listings arrive in two shapes. The linked-account endpoint
//! returns records with nested `children` and a
//! `media_product_type`; the direct endpoint returns flat records. The
//! shape is decided once at ingestion by [`RawMediaRecord::from_value`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record that could not be ingested.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed media record: {reason}")]
pub struct MalformedRecord {
    /// Why ingestion failed.
    pub reason: String,
}

/// Media kind tag as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamMediaKind {
    /// `IMAGE`
    Image,
    /// `VIDEO`
    Video,
    /// `REELS` (newer API generations)
    Reels,
    /// `CAROUSEL_ALBUM`
    CarouselAlbum,
    /// Anything else.
    Other(String),
}

impl UpstreamMediaKind {
    /// Parse an upstream tag. Matching is case-insensitive.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "IMAGE" => Self::Image,
            "VIDEO" => Self::Video,
            "REELS" | "REEL" => Self::Reels,
            "CAROUSEL_ALBUM" => Self::CarouselAlbum,
            _ => Self::Other(tag.to_string()),
        }
    }

    /// Canonical type for short-form video tags, `None` for everything else.
    pub fn canonical(&self) -> Option<MediaType> {
        match self {
            Self::Video | Self::Reels => Some(MediaType::Video),
            Self::Image | Self::CarouselAlbum | Self::Other(_) => None,
        }
    }
}

/// Canonical media type. Only video survives normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    /// Short-form video.
    Video,
}

/// Flat record from the direct endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DirectMediaRecord {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub media_type: String,
    #[serde(default)]
    pub media_url: Option<String>,
    pub permalink: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Child of a carousel in the linked-account shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChildMedia {
    pub id: String,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
}

/// `children` of a linked-account record.
///
/// The Graph API wraps children in a `{"data": [...]}` envelope; some
/// listings inline the array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Children {
    Envelope {
        #[serde(default)]
        data: Vec<ChildMedia>,
    },
    List(Vec<ChildMedia>),
}

impl Children {
    /// Child records, whichever shape they arrived in.
    pub fn items(&self) -> &[ChildMedia] {
        match self {
            Self::Envelope { data } => data,
            Self::List(items) => items,
        }
    }
}

/// Record from the linked business-account endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkedMediaRecord {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub media_type: String,
    #[serde(default)]
    pub media_product_type: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    pub permalink: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub children: Option<Children>,
}

/// An upstream media record, tagged by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawMediaRecord {
    /// Flat shape returned when the credential addresses the account directly.
    Direct(DirectMediaRecord),
    /// Nested shape returned by the linked business-account endpoint.
    Linked(LinkedMediaRecord),
}

impl RawMediaRecord {
    /// Classify and decode one upstream record.
    ///
    /// A non-null `children` selects the linked shape.
    pub fn from_value(value: &Value) -> Result<Self, MalformedRecord> {
        let object = value.as_object().ok_or_else(|| MalformedRecord {
            reason: "record is not a JSON object".to_string(),
        })?;

        let malformed = |e: serde_json::Error| MalformedRecord { reason: e.to_string() };

        if object.get("children").is_some_and(|children| !children.is_null()) {
            LinkedMediaRecord::deserialize(value)
                .map(Self::Linked)
                .map_err(malformed)
        } else {
            DirectMediaRecord::deserialize(value)
                .map(Self::Direct)
                .map_err(malformed)
        }
    }

    /// Record id.
    pub fn id(&self) -> &str {
        match self {
            Self::Direct(r) => &r.id,
            Self::Linked(r) => &r.id,
        }
    }

    /// Effective upstream kind.
    ///
    /// In the linked shape a `media_product_type` of `REELS` wins over the
    /// generic `media_type`.
    pub fn kind(&self) -> UpstreamMediaKind {
        match self {
            Self::Direct(r) => UpstreamMediaKind::from_tag(&r.media_type),
            Self::Linked(r) => {
                let product = r.media_product_type.as_deref().map(UpstreamMediaKind::from_tag);
                match product {
                    Some(UpstreamMediaKind::Reels) => UpstreamMediaKind::Reels,
                    _ => UpstreamMediaKind::from_tag(&r.media_type),
                }
            }
        }
    }
}

/// Canonical media item handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMediaItem {
    pub id: String,
    /// Empty when upstream omitted the caption.
    pub caption: String,
    pub media_type: MediaType,
    pub media_url: Option<String>,
    pub permalink: String,
    pub thumbnail_url: Option<String>,
    /// ISO-8601 timestamp.
    pub timestamp: String,
    pub username: Option<String>,
}
