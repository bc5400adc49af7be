use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType, ReturnValue,
    ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoClient;

use super::error::ImageError;
use super::model::Image;
use super::store::{new_image, parse_image_id, ImageStore};

const IMAGE_PK: &str = "IMAGE";
const IMAGE_SK_PREFIX: &str = "IMAGE#";

type Item = HashMap<String, AttributeValue>;

/// DynamoDB-backed store. All images share the `IMAGE` partition, one item per
/// image under `SK = IMAGE#<id>`.
#[derive(Debug, Clone)]
pub struct DynamoImageStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoImageStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Create the table when it does not exist yet (fresh DynamoDB Local, test namespace)
    pub async fn ensure_table(&self) -> Result<(), ImageError> {
        match self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
        {
            Ok(_) => return Ok(()),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception()) => {}
            Err(e) => {
                return Err(ImageError::storage(format!(
                    "DynamoDB describe_table error: {}",
                    DisplayErrorContext(&e)
                )))
            }
        }

        tracing::info!("Creating table {}", self.table_name);

        self.client
            .create_table()
            .table_name(&self.table_name)
            .attribute_definitions(string_attribute("PK")?)
            .attribute_definitions(string_attribute("SK")?)
            .key_schema(key_element("PK", KeyType::Hash)?)
            .key_schema(key_element("SK", KeyType::Range)?)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .map_err(|e| {
                ImageError::storage(format!(
                    "DynamoDB create_table error: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }
}

#[async_trait]
impl ImageStore for DynamoImageStore {
    async fn create(&self, title: &str, image_url: &str) -> Result<Image, ImageError> {
        let image = new_image(title, image_url);
        self.save(&image).await?;
        Ok(image)
    }

    async fn get_all(&self) -> Result<Vec<Image>, ImageError> {
        let mut images = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
                .expression_attribute_values(":pk", AttributeValue::S(IMAGE_PK.to_string()))
                .expression_attribute_values(
                    ":sk_prefix",
                    AttributeValue::S(IMAGE_SK_PREFIX.to_string()),
                )
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| {
                    ImageError::storage(format!("DynamoDB query error: {}", DisplayErrorContext(&e)))
                })?;

            for item in result.items() {
                images.push(image_from_item(item)?);
            }

            match result.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        // SK order is random (UUIDs), so restore insertion order
        images.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(images)
    }

    async fn get_by_id(&self, id: &str) -> Result<Image, ImageError> {
        let image_id = parse_image_id(id)?;

        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(IMAGE_PK.to_string()))
            .key("SK", AttributeValue::S(format!("{}{}", IMAGE_SK_PREFIX, image_id)))
            .send()
            .await
            .map_err(|e| {
                ImageError::storage(format!("DynamoDB get_item error: {}", DisplayErrorContext(&e)))
            })?;

        match result.item() {
            Some(item) => image_from_item(item),
            None => Err(ImageError::NotFound),
        }
    }

    async fn replace_fields(
        &self,
        id: &str,
        title: &str,
        image_url: &str,
    ) -> Result<Image, ImageError> {
        let image_id = parse_image_id(id)?;

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(IMAGE_PK.to_string()))
            .key("SK", AttributeValue::S(format!("{}{}", IMAGE_SK_PREFIX, image_id)))
            .update_expression("SET #title = :title, #image_url = :image_url")
            // Without the condition update_item would upsert a half-empty item
            .condition_expression("attribute_exists(PK)")
            .expression_attribute_names("#title", "title")
            .expression_attribute_names("#image_url", "image_url")
            .expression_attribute_values(":title", AttributeValue::S(title.to_string()))
            .expression_attribute_values(":image_url", AttributeValue::S(image_url.to_string()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => match output.attributes() {
                Some(item) => image_from_item(item),
                None => Err(ImageError::storage("DynamoDB update_item returned no attributes")),
            },
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                Err(ImageError::NotFound)
            }
            Err(e) => Err(ImageError::storage(format!(
                "DynamoDB update_item error: {}",
                DisplayErrorContext(&e)
            ))),
        }
    }

    async fn save(&self, image: &Image) -> Result<(), ImageError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(image_to_item(image)))
            .send()
            .await
            .map_err(|e| {
                ImageError::storage(format!("DynamoDB put_item error: {}", DisplayErrorContext(&e)))
            })?;

        Ok(())
    }
}

fn string_attribute(name: &str) -> Result<AttributeDefinition, ImageError> {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .map_err(|e| ImageError::storage(format!("Invalid attribute definition: {}", e)))
}

fn key_element(name: &str, key_type: KeyType) -> Result<KeySchemaElement, ImageError> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .map_err(|e| ImageError::storage(format!("Invalid key schema: {}", e)))
}

pub(crate) fn image_to_item(image: &Image) -> Item {
    HashMap::from([
        ("PK".to_string(), AttributeValue::S(IMAGE_PK.to_string())),
        (
            "SK".to_string(),
            AttributeValue::S(format!("{}{}", IMAGE_SK_PREFIX, image.id)),
        ),
        ("title".to_string(), AttributeValue::S(image.title.clone())),
        ("image_url".to_string(), AttributeValue::S(image.image_url.clone())),
        ("likes".to_string(), AttributeValue::N(image.likes.to_string())),
        ("followers".to_string(), AttributeValue::N(image.followers.to_string())),
        (
            "tags".to_string(),
            AttributeValue::L(image.tags.iter().cloned().map(AttributeValue::S).collect()),
        ),
        ("created_at".to_string(), AttributeValue::S(image.created_at.clone())),
    ])
}

fn malformed(id: &str, name: &str) -> ImageError {
    ImageError::storage(format!("Malformed image {}: bad {}", id, name))
}

/// `None` when the attribute is absent; an error when it is present but is
/// not a number of the expected range.
fn number_field<T: FromStr>(item: &Item, id: &str, name: &str) -> Result<Option<T>, ImageError> {
    item.get(name)
        .map(|v| {
            v.as_n()
                .ok()
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| malformed(id, name))
        })
        .transpose()
}

fn string_field(item: &Item, id: &str, name: &str) -> Result<Option<String>, ImageError> {
    item.get(name)
        .map(|v| v.as_s().cloned().map_err(|_| malformed(id, name)))
        .transpose()
}

/// Decode a stored item. Title and URL are required; counters and tags fall
/// back to the creation defaults only when absent. A field that is present
/// but does not decode is an error, so a later save cannot overwrite it.
pub(crate) fn image_from_item(item: &Item) -> Result<Image, ImageError> {
    let id = item
        .get("SK")
        .and_then(|v| v.as_s().ok())
        .and_then(|sk| sk.strip_prefix(IMAGE_SK_PREFIX))
        .ok_or_else(|| ImageError::storage("Malformed image item: missing SK"))?;

    let required = |name: &str| -> Result<String, ImageError> {
        string_field(item, id, name)?.ok_or_else(|| {
            ImageError::storage(format!("Malformed image {}: missing {}", id, name))
        })
    };

    let tags = match item.get("tags") {
        None => vec![],
        Some(value) => value
            .as_l()
            .map_err(|_| malformed(id, "tags"))?
            .iter()
            .map(|t| t.as_s().cloned().map_err(|_| malformed(id, "tags")))
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(Image {
        id: id.to_string(),
        title: required("title")?,
        image_url: required("image_url")?,
        likes: number_field(item, id, "likes")?.unwrap_or(0),
        followers: number_field(item, id, "followers")?.unwrap_or(0),
        tags,
        created_at: string_field(item, id, "created_at")?.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_item(id: &str) -> Item {
        HashMap::from([
            ("PK".to_string(), AttributeValue::S("IMAGE".to_string())),
            ("SK".to_string(), AttributeValue::S(format!("IMAGE#{}", id))),
            ("title".to_string(), AttributeValue::S("Sunset".to_string())),
            (
                "image_url".to_string(),
                AttributeValue::S("https://example.com/sunset.jpg".to_string()),
            ),
        ])
    }

    #[test]
    fn missing_counters_and_tags_fall_back_to_defaults() {
        let image = image_from_item(&stored_item("abc")).expect("item should decode");

        assert_eq!(image.id, "abc");
        assert_eq!(image.title, "Sunset");
        assert_eq!(image.image_url, "https://example.com/sunset.jpg");
        assert_eq!(image.likes, 0);
        assert_eq!(image.followers, 0);
        assert!(image.tags.is_empty());
    }

    #[test]
    fn negative_followers_and_duplicate_tags_survive_encoding() {
        let mut image = new_image("Sunset", "https://example.com/sunset.jpg");
        image.followers = -2;
        image.tags = vec!["sky".to_string(), "sky".to_string(), "red".to_string()];

        let item = image_to_item(&image);
        assert_eq!(item.get("followers"), Some(&AttributeValue::N("-2".to_string())));

        let decoded = image_from_item(&item).expect("item should decode");
        assert_eq!(decoded, image);
    }

    #[test]
    fn item_without_title_is_a_storage_error() {
        let mut item = stored_item("abc");
        item.remove("title");

        let error = image_from_item(&item).expect_err("title is required");
        assert!(matches!(error, ImageError::Storage(detail) if detail.contains("title")));
    }

    #[test]
    fn present_but_malformed_counters_are_storage_errors() {
        let cases = [
            ("likes", AttributeValue::N("-1".to_string())),
            ("likes", AttributeValue::N("lots".to_string())),
            ("likes", AttributeValue::S("3".to_string())),
            ("followers", AttributeValue::N("1.5".to_string())),
        ];

        for (name, value) in cases {
            let mut item = stored_item("abc");
            item.insert(name.to_string(), value);

            let error = image_from_item(&item).expect_err("counter should be rejected");
            assert_eq!(error, ImageError::storage(format!("Malformed image abc: bad {}", name)));
        }
    }

    #[test]
    fn tags_with_a_non_string_entry_are_a_storage_error() {
        let mut item = stored_item("abc");
        item.insert(
            "tags".to_string(),
            AttributeValue::L(vec![
                AttributeValue::S("sky".to_string()),
                AttributeValue::N("7".to_string()),
            ]),
        );
        assert_eq!(
            image_from_item(&item),
            Err(ImageError::storage("Malformed image abc: bad tags"))
        );

        item.insert("tags".to_string(), AttributeValue::S("sky".to_string()));
        assert!(matches!(image_from_item(&item), Err(ImageError::Storage(_))));
    }

    #[test]
    fn title_stored_with_the_wrong_type_is_a_storage_error() {
        let mut item = stored_item("abc");
        item.insert("title".to_string(), AttributeValue::N("5".to_string()));

        assert_eq!(
            image_from_item(&item),
            Err(ImageError::storage("Malformed image abc: bad title"))
        );
    }

    #[test]
    fn item_without_sort_key_is_a_storage_error() {
        let mut item = stored_item("abc");
        item.remove("SK");

        assert!(matches!(image_from_item(&item), Err(ImageError::Storage(_))));
    }
}
