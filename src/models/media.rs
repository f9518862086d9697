use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of media stored for a record, derived from the upload content type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum MediaType {
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "video")]
    Video,
}

impl MediaType {
    /// Classify an upload by its content type.
    ///
    /// Anything starting with `image` is an image, anything starting with
    /// `video` is a video, everything else is rejected.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.starts_with("image") {
            Some(MediaType::Image)
        } else if content_type.starts_with("video") {
            Some(MediaType::Video)
        } else {
            None
        }
    }

    /// Content type used when serving the file back. Not sniffed from the
    /// file itself.
    pub fn serving_content_type(&self) -> &'static str {
        match self {
            MediaType::Image => "image/jpeg",
            MediaType::Video => "video/mp4",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
        }
    }
}

impl TryFrom<String> for MediaType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            _ => Err(format!("Invalid media type: {}", value)),
        }
    }
}

/// A single cataloged media item.
///
/// Serialized with `_id` and camelCase keys so both backends produce the
/// same wire shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub filename: String,
    pub filepath: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default)]
    pub likes: i64,
    #[serde(with = "iso8601_millis")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl MediaRecord {
    pub fn is_image(&self) -> bool {
        self.media_type == MediaType::Image
    }

    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }
}

/// Fields supplied by the caller when creating a record. The store assigns
/// `id` and `createdAt`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMedia {
    pub filename: String,
    pub filepath: String,
    pub media_type: MediaType,
    pub likes: i64,
}

impl NewMedia {
    pub fn new(filename: impl Into<String>, filepath: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            filename: filename.into(),
            filepath: filepath.into(),
            media_type,
            likes: 0,
        }
    }
}

/// Mutable subset of a record. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaPatch {
    pub filename: Option<String>,
    pub likes: Option<i64>,
}

impl MediaPatch {
    pub fn apply_to(&self, record: &mut MediaRecord) {
        if let Some(filename) = &self.filename {
            record.filename = filename.clone();
        }
        if let Some(likes) = self.likes {
            record.likes = likes;
        }
    }
}

/// Update applied by `RecordStore::update_by_id`.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaUpdate {
    /// Add a (possibly negative) delta to the like counter.
    IncrementLikes(i64),
    /// Shallow-merge the present fields onto the record.
    Set(MediaPatch),
}

impl MediaUpdate {
    pub fn apply_to(&self, record: &mut MediaRecord) {
        match self {
            MediaUpdate::IncrementLikes(delta) => record.likes += delta,
            MediaUpdate::Set(patch) => patch.apply_to(record),
        }
    }
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix, the
/// format the JSON database file has always used.
pub mod iso8601_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
