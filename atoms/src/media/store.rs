use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use super::error::ImageError;
use super::model::Image;

/// Durable keyed storage of Image records.
///
/// Implementations own id generation and the default field values of a new
/// record. The service layer never holds a record beyond one request, and
/// `save` is a plain overwrite: concurrent read-modify-write on the same id
/// resolves as last write wins.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist a new record with a fresh id, zero counters and no tags
    async fn create(&self, title: &str, image_url: &str) -> Result<Image, ImageError>;

    /// All records, oldest first
    async fn get_all(&self) -> Result<Vec<Image>, ImageError>;

    /// `NotFound` for an unknown id and for a string that is not an id at all
    async fn get_by_id(&self, id: &str) -> Result<Image, ImageError>;

    /// Overwrite title and image URL only, returning the updated record
    async fn replace_fields(
        &self,
        id: &str,
        title: &str,
        image_url: &str,
    ) -> Result<Image, ImageError>;

    /// Write back a record previously returned by this store
    async fn save(&self, image: &Image) -> Result<(), ImageError>;
}

/// Ids are UUIDs; anything else can never match a record.
pub fn parse_image_id(id: &str) -> Result<Uuid, ImageError> {
    Uuid::parse_str(id).map_err(|_| ImageError::NotFound)
}

pub fn new_image(title: &str, image_url: &str) -> Image {
    Image {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        image_url: image_url.to_string(),
        likes: 0,
        followers: 0,
        tags: vec![],
        // Fixed width so the timestamps also sort lexically
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    }
}
