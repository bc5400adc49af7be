use serde_json::Value;

use super::error::{ImageError, TAG_REQUIRED, TITLE_AND_URL_REQUIRED};
use super::model::{CreateImagePayload, Image, TagPayload, UpdateImagePayload};
use super::store::ImageStore;

/// Read a required field the way a loosely typed client sends it.
///
/// Absent, `null`, `""`, `false` and `0` count as missing. Other numbers and
/// `true` are kept in their string form. Arrays and objects are rejected.
fn required(name: &str, field: Option<Value>) -> Result<Option<String>, ImageError> {
    match field {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(true)) => Ok(Some("true".to_string())),
        Some(Value::Array(_)) | Some(Value::Object(_)) => Err(ImageError::validation(format!(
            "Invalid request body: {} must be a string",
            name
        ))),
    }
}

fn title_and_url(
    title: Option<Value>,
    image_url: Option<Value>,
) -> Result<(String, String), ImageError> {
    match (required("title", title)?, required("imageUrl", image_url)?) {
        (Some(title), Some(image_url)) => Ok((title, image_url)),
        _ => Err(ImageError::validation(TITLE_AND_URL_REQUIRED)),
    }
}

fn tag(payload: TagPayload) -> Result<String, ImageError> {
    required("tag", payload.tag)?.ok_or_else(|| ImageError::validation(TAG_REQUIRED))
}

/// Load, apply one in-memory mutation, persist once.
///
/// There is no compare-and-swap: two concurrent mutations of the same image
/// can overwrite each other.
async fn mutate_image<F>(store: &dyn ImageStore, id: &str, mutation: F) -> Result<Image, ImageError>
where
    F: FnOnce(&mut Image),
{
    let mut image = store.get_by_id(id).await?;
    mutation(&mut image);
    store.save(&image).await?;
    Ok(image)
}

/// Create a new image
pub async fn add_image(
    store: &dyn ImageStore,
    payload: CreateImagePayload,
) -> Result<Image, ImageError> {
    let (title, image_url) = title_and_url(payload.title, payload.image_url)?;
    store.create(&title, &image_url).await
}

pub async fn get_all_images(store: &dyn ImageStore) -> Result<Vec<Image>, ImageError> {
    store.get_all().await
}

pub async fn get_image(store: &dyn ImageStore, id: &str) -> Result<Image, ImageError> {
    store.get_by_id(id).await
}

/// Replace title and URL; counters and tags are left alone
pub async fn update_image(
    store: &dyn ImageStore,
    id: &str,
    payload: UpdateImagePayload,
) -> Result<Image, ImageError> {
    let (title, image_url) = title_and_url(payload.title, payload.image_url)?;
    store.replace_fields(id, &title, &image_url).await
}

pub async fn like_image(store: &dyn ImageStore, id: &str) -> Result<Image, ImageError> {
    mutate_image(store, id, Image::like).await
}

/// Decrement likes, stopping at zero
pub async fn unlike_image(store: &dyn ImageStore, id: &str) -> Result<Image, ImageError> {
    mutate_image(store, id, Image::unlike).await
}

pub async fn follow_image(store: &dyn ImageStore, id: &str) -> Result<Image, ImageError> {
    mutate_image(store, id, Image::follow).await
}

/// Decrement followers. Unlike `unlike_image` this has no floor, so the
/// count can go negative; clients rely on the current behaviour.
pub async fn unfollow_image(store: &dyn ImageStore, id: &str) -> Result<Image, ImageError> {
    mutate_image(store, id, Image::unfollow).await
}

/// Append a tag; duplicates are kept
pub async fn add_tag(
    store: &dyn ImageStore,
    id: &str,
    payload: TagPayload,
) -> Result<Image, ImageError> {
    let tag = tag(payload)?;
    mutate_image(store, id, move |image| image.add_tag(tag)).await
}

/// Remove every occurrence of a tag. Removing an absent tag is not an error.
pub async fn remove_tag(
    store: &dyn ImageStore,
    id: &str,
    payload: TagPayload,
) -> Result<Image, ImageError> {
    let tag = tag(payload)?;
    mutate_image(store, id, |image| image.remove_tag(&tag)).await
}
