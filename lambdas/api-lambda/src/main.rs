use lambda_http::{run, service_fn, Error};
use pinboard_shared::AppState;
use tracing_subscriber::{fmt, EnvFilter};

mod http_handler;

use http_handler::function_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        // CloudWatch adds its own timestamps
        .without_time()
        .with_target(false)
        .init();

    tracing::info!("Initializing state...");
    let state = AppState::new().await?;

    // The store client lives exactly as long as the runtime loop
    run(service_fn(|event| function_handler(event, state.clone()))).await
}
