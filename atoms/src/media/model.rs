use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Image domain model - a titled, URL-referencing pin with counters and tags
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Image {
    pub id: String,
    pub title: String,

    /// Stored as "image_url" in DynamoDB
    #[serde(rename = "imageUrl")]
    pub image_url: String,

    /// Never negative: unlike stops at zero
    pub likes: u64,

    /// No floor: unfollow can take this below zero
    pub followers: i64,

    pub tags: Vec<String>,

    /// Only used to keep listings in insertion order, never sent to clients
    #[serde(skip)]
    pub created_at: String,
}

impl Image {
    pub fn like(&mut self) {
        self.likes = self.likes.saturating_add(1);
    }

    pub fn unlike(&mut self) {
        // Floored at zero
        self.likes = self.likes.saturating_sub(1);
    }

    pub fn follow(&mut self) {
        self.followers = self.followers.saturating_add(1);
    }

    pub fn unfollow(&mut self) {
        self.followers = self.followers.saturating_sub(1);
    }

    pub fn add_tag(&mut self, tag: String) {
        self.tags.push(tag);
    }

    /// Removes every occurrence of `tag`, not just the first
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }
}

/// Body of POST /images and PUT /images/{id}.
///
/// Fields stay untyped JSON: numbers and booleans are accepted and stored as
/// their string form, falsy values count as missing.
#[derive(Debug, Default, Deserialize)]
pub struct ImageFieldsPayload {
    pub title: Option<Value>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<Value>,
}

pub type CreateImagePayload = ImageFieldsPayload;
pub type UpdateImagePayload = ImageFieldsPayload;

#[derive(Debug, Default, Deserialize)]
pub struct TagPayload {
    pub tag: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct LikesResponse {
    pub message: &'static str,
    pub likes: u64,
}

#[derive(Debug, Serialize)]
pub struct FollowersResponse {
    pub message: &'static str,
    pub followers: i64,
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub message: &'static str,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(likes: u64, followers: i64) -> Image {
        Image {
            id: "abc".to_string(),
            title: "Test Image".to_string(),
            image_url: "https://example.com/image.jpg".to_string(),
            likes,
            followers,
            tags: vec![],
            created_at: String::new(),
        }
    }

    #[test]
    fn counters_saturate_at_their_bounds() {
        let mut top = image(u64::MAX, i64::MAX);
        top.like();
        top.follow();
        assert_eq!(top.likes, u64::MAX);
        assert_eq!(top.followers, i64::MAX);

        let mut bottom = image(0, i64::MIN);
        bottom.unlike();
        bottom.unfollow();
        assert_eq!(bottom.likes, 0);
        assert_eq!(bottom.followers, i64::MIN);
    }
}
