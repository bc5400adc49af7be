use lambda_http::{http::StatusCode, Body, Error as LambdaError, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::ImageError;
use super::model::{ErrorResponse, FollowersResponse, LikesResponse, TagsResponse};
use super::service::{
    add_image, add_tag, follow_image, get_all_images, get_image, like_image, remove_tag,
    unfollow_image, unlike_image, update_image,
};
use super::store::ImageStore;

fn invalid_body(e: serde_json::Error) -> ImageError {
    ImageError::validation(format!("Invalid request body: {}", e))
}

/// Only a JSON object is a valid body. Going through a map first stops serde
/// from filling the payload struct positionally out of an array.
/// An empty body reads as `{}` so it fails field validation rather than parsing.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ImageError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let fields: Map<String, Value> = serde_json::from_slice(body).map_err(invalid_body)?;
    serde_json::from_value(Value::Object(fields)).map_err(invalid_body)
}

pub fn json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
) -> Result<Response<Body>, LambdaError> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(value)?.into())
        .map_err(Box::new)?)
}

/// Map an `ImageError` to its status code and `{message, error?}` body.
/// `context` names the failed operation and is only used for storage errors.
pub fn error_response(error: ImageError, context: &str) -> Result<Response<Body>, LambdaError> {
    let (status, body) = match error {
        ImageError::Validation(message) => (
            StatusCode::BAD_REQUEST,
            ErrorResponse {
                message,
                error: None,
            },
        ),
        ImageError::NotFound => (
            StatusCode::NOT_FOUND,
            ErrorResponse {
                message: ImageError::NotFound.to_string(),
                error: None,
            },
        ),
        ImageError::Storage(detail) => {
            tracing::error!("❌ {}: {}", context, detail);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    message: context.to_string(),
                    error: Some(detail),
                },
            )
        }
    };

    json_response(status, &body)
}

fn respond<T: Serialize>(
    result: Result<T, ImageError>,
    status: StatusCode,
    context: &str,
) -> Result<Response<Body>, LambdaError> {
    match result {
        Ok(value) => json_response(status, &value),
        Err(e) => error_response(e, context),
    }
}

/// HTTP Handler: POST /images
pub async fn add_image_handler(
    store: &dyn ImageStore,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let result = match parse_body(body) {
        Ok(payload) => add_image(store, payload).await,
        Err(e) => Err(e),
    };

    if let Ok(image) = &result {
        tracing::info!("✅ Created image {}", image.id);
    }

    respond(result, StatusCode::CREATED, "Error adding image")
}

/// HTTP Handler: GET /images
pub async fn list_images_handler(store: &dyn ImageStore) -> Result<Response<Body>, LambdaError> {
    respond(
        get_all_images(store).await,
        StatusCode::OK,
        "Error fetching images",
    )
}

/// HTTP Handler: GET /images/{id}
pub async fn get_image_handler(
    store: &dyn ImageStore,
    image_id: &str,
) -> Result<Response<Body>, LambdaError> {
    respond(
        get_image(store, image_id).await,
        StatusCode::OK,
        "Error fetching image",
    )
}

/// HTTP Handler: PUT /images/{id}
pub async fn update_image_handler(
    store: &dyn ImageStore,
    image_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let result = match parse_body(body) {
        Ok(payload) => update_image(store, image_id, payload).await,
        Err(e) => Err(e),
    };

    respond(result, StatusCode::OK, "Error updating image")
}

/// HTTP Handler: POST /images/{id}/like
pub async fn like_image_handler(
    store: &dyn ImageStore,
    image_id: &str,
) -> Result<Response<Body>, LambdaError> {
    let result = like_image(store, image_id).await.map(|image| LikesResponse {
        message: "Image liked",
        likes: image.likes,
    });

    respond(result, StatusCode::OK, "Error liking image")
}

/// HTTP Handler: POST /images/{id}/unlike
pub async fn unlike_image_handler(
    store: &dyn ImageStore,
    image_id: &str,
) -> Result<Response<Body>, LambdaError> {
    let result = unlike_image(store, image_id).await.map(|image| LikesResponse {
        message: "Image unliked",
        likes: image.likes,
    });

    respond(result, StatusCode::OK, "Error unliking image")
}

/// HTTP Handler: POST /images/{id}/follow
pub async fn follow_image_handler(
    store: &dyn ImageStore,
    image_id: &str,
) -> Result<Response<Body>, LambdaError> {
    let result = follow_image(store, image_id)
        .await
        .map(|image| FollowersResponse {
            message: "Image followed",
            followers: image.followers,
        });

    respond(result, StatusCode::OK, "Error following image")
}

/// HTTP Handler: POST /images/{id}/unfollow
pub async fn unfollow_image_handler(
    store: &dyn ImageStore,
    image_id: &str,
) -> Result<Response<Body>, LambdaError> {
    let result = unfollow_image(store, image_id)
        .await
        .map(|image| FollowersResponse {
            message: "Unfollowed image",
            followers: image.followers,
        });

    respond(result, StatusCode::OK, "Error unfollowing image")
}

/// HTTP Handler: POST /images/{id}/tag
pub async fn add_tag_handler(
    store: &dyn ImageStore,
    image_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let result = match parse_body(body) {
        Ok(payload) => add_tag(store, image_id, payload).await,
        Err(e) => Err(e),
    }
    .map(|image| TagsResponse {
        message: "Tag added",
        tags: image.tags,
    });

    respond(result, StatusCode::OK, "Error adding tag")
}

/// HTTP Handler: POST /images/{id}/untag
pub async fn remove_tag_handler(
    store: &dyn ImageStore,
    image_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let result = match parse_body(body) {
        Ok(payload) => remove_tag(store, image_id, payload).await,
        Err(e) => Err(e),
    }
    .map(|image| TagsResponse {
        message: "Tag removed",
        tags: image.tags,
    });

    respond(result, StatusCode::OK, "Error removing tag")
}
