use std::sync::Arc;

use lambda_http::http::header::{HeaderValue, VARY};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use pinboard_atoms::media;
use pinboard_shared::AppState;

fn with_cors_headers(mut resp: Response<Body>, cors_origin: &str) -> Response<Body> {
    let headers = resp.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_str(cors_origin).unwrap_or_else(|_| HeaderValue::from_static("*")),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PUT,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));

    resp
}

fn finalize_response(
    resp: Result<Response<Body>, Error>,
    cors_origin: &str,
) -> Result<Response<Body>, Error> {
    resp.map(|r| with_cors_headers(r, cors_origin))
}

/// Main Lambda handler - routes requests to the image endpoints
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    let cors_origin = state.config.cors_origin.as_str();
    let store = state.store.as_ref();

    tracing::info!("🚀 Pinboard API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if *method == Method::OPTIONS {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp, cors_origin));
    }

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let resp = match (method, parts.as_slice()) {
        // POST /images - add image
        (&Method::POST, ["images"]) => media::add_image_handler(store, body).await,
        // GET /images - list images
        (&Method::GET, ["images"]) => media::list_images_handler(store).await,
        // GET /images/{id} - get image
        (&Method::GET, ["images", image_id]) => media::get_image_handler(store, image_id).await,
        // PUT /images/{id} - replace title and url
        (&Method::PUT, ["images", image_id]) => {
            media::update_image_handler(store, image_id, body).await
        }

        // --- COUNTERS ---
        (&Method::POST, ["images", image_id, "like"]) => {
            media::like_image_handler(store, image_id).await
        }
        (&Method::POST, ["images", image_id, "unlike"]) => {
            media::unlike_image_handler(store, image_id).await
        }
        (&Method::POST, ["images", image_id, "follow"]) => {
            media::follow_image_handler(store, image_id).await
        }
        (&Method::POST, ["images", image_id, "unfollow"]) => {
            media::unfollow_image_handler(store, image_id).await
        }

        // --- TAGS ---
        (&Method::POST, ["images", image_id, "tag"]) => {
            media::add_tag_handler(store, image_id, body).await
        }
        (&Method::POST, ["images", image_id, "untag"]) => {
            media::remove_tag_handler(store, image_id, body).await
        }

        _ => {
            tracing::warn!("⚠️ No route matched - Method: {} Path: {}", method, path);
            not_found()
        }
    };

    finalize_response(resp, cors_origin)
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"message": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}
