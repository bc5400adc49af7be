use thiserror::Error;

pub const TITLE_AND_URL_REQUIRED: &str = "Title and image URL are required";
pub const TAG_REQUIRED: &str = "Tag is required";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Missing or malformed request input (400)
    #[error("{0}")]
    Validation(String),

    /// No record for the given id, or the id is not a valid identifier (404)
    #[error("Image not found")]
    NotFound,

    /// Any failure talking to the store (500); the detail is opaque
    #[error("{0}")]
    Storage(String),
}

impl ImageError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(detail: impl Into<String>) -> Self {
        Self::Storage(detail.into())
    }
}
