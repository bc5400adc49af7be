use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::ImageError;
use super::model::Image;
use super::store::{new_image, parse_image_id, ImageStore};

/// In-process store, insertion ordered. Backs the tests and `IMAGE_STORE=memory`.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    images: RwLock<Vec<Image>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.images.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.images.read().await.is_empty()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn create(&self, title: &str, image_url: &str) -> Result<Image, ImageError> {
        let image = new_image(title, image_url);
        self.images.write().await.push(image.clone());
        Ok(image)
    }

    async fn get_all(&self) -> Result<Vec<Image>, ImageError> {
        Ok(self.images.read().await.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Image, ImageError> {
        let key = parse_image_id(id)?.to_string();
        self.images
            .read()
            .await
            .iter()
            .find(|img| img.id == key)
            .cloned()
            .ok_or(ImageError::NotFound)
    }

    async fn replace_fields(
        &self,
        id: &str,
        title: &str,
        image_url: &str,
    ) -> Result<Image, ImageError> {
        let key = parse_image_id(id)?.to_string();
        let mut images = self.images.write().await;
        let image = images
            .iter_mut()
            .find(|img| img.id == key)
            .ok_or(ImageError::NotFound)?;

        image.title = title.to_string();
        image.image_url = image_url.to_string();
        Ok(image.clone())
    }

    async fn save(&self, image: &Image) -> Result<(), ImageError> {
        let mut images = self.images.write().await;
        match images.iter_mut().find(|img| img.id == image.id) {
            Some(existing) => *existing = image.clone(),
            // Same upsert semantics as a DynamoDB put_item
            None => images.push(image.clone()),
        }
        Ok(())
    }
}
