use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::ParseError;

/// Processing state of an image. Owned by the backend; the client only mirrors it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl ImageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageStatus::Uploaded => "uploaded",
            ImageStatus::Processing => "processing",
            ImageStatus::Completed => "completed",
            ImageStatus::Failed => "failed",
        }
    }

    /// No further backend transition is expected without a new trigger.
    pub fn is_terminal(self) -> bool {
        matches!(self, ImageStatus::Completed | ImageStatus::Failed)
    }
}

impl Display for ImageStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(ImageStatus::Uploaded),
            "processing" => Ok(ImageStatus::Processing),
            "completed" => Ok(ImageStatus::Completed),
            "failed" => Ok(ImageStatus::Failed),
            _ => Err(ParseError::new("image status", s)),
        }
    }
}

/// Backend record describing one uploaded image.
///
/// Fields the backend returns beyond `id`, `filename` and `status` are kept in `extra`
/// so they survive a merge or a serialize round trip. Process and status responses may
/// omit `filename`; it is then empty until merged onto a listed record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageMeta {
    pub id: String,
    #[serde(default)]
    pub filename: String,
    pub status: ImageStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageMeta {
    pub fn new(id: impl Into<String>, filename: impl Into<String>, status: ImageStatus) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            status,
            extra: Map::new(),
        }
    }

    /// Apply a newer server response for the same id on top of this record.
    ///
    /// Everything present in `newer` wins; a missing filename and extra fields only
    /// known locally are kept.
    pub fn merge_from(&mut self, newer: ImageMeta) {
        if !newer.filename.is_empty() {
            self.filename = newer.filename;
        }
        self.status = newer.status;
        self.extra.extend(newer.extra);
    }

    /// Case-insensitive match of `needle` against filename, id or status.
    pub fn matches_query(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.filename.to_lowercase().contains(&needle)
            || self.id.to_lowercase().contains(&needle)
            || self.status.as_str().contains(&needle)
    }
}

/// One page of the image listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImagePage {
    #[serde(default)]
    pub items: Vec<ImageMeta>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

impl ImagePage {
    /// Whether the page respects the listing contract for the requested size.
    pub fn is_consistent(&self, page_size: u32) -> bool {
        self.items.len() <= page_size as usize && self.total >= self.items.len() as u64
    }
}

/// Binary rendition of an image addressable by id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Original,
    Processed,
    Edited,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Original, Variant::Processed, Variant::Edited];

    /// Trailing path segment of the content endpoint.
    pub fn path_segment(self) -> &'static str {
        match self {
            Variant::Original => "original",
            Variant::Processed => "processed",
            Variant::Edited => "edited",
        }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.path_segment())
    }
}

impl FromStr for Variant {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "original" => Ok(Variant::Original),
            "processed" => Ok(Variant::Processed),
            "edited" => Ok(Variant::Edited),
            _ => Err(ParseError::new("variant", s)),
        }
    }
}
