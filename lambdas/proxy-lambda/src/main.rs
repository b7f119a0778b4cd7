use aqua_proxy_shared::config::Config;
use aqua_proxy_shared::origin::HttpOrigin;
use aqua_proxy_shared::s3::S3BlobStore;
use aqua_proxy_shared::AppState;
use aws_sdk_s3::Client as S3Client;
use lambda_http::{run, service_fn, tracing, Error, Request};
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Initialize clients once at startup
    let config = Config::from_env()?;
    let aws_config = aws_config::load_from_env().await;

    let store = S3BlobStore::new(S3Client::new(&aws_config), config.bucket.clone());
    let origin = HttpOrigin::new()?;

    tracing::info!("Aqua proxy ready, caching into bucket {}", config.bucket);
    let state = AppState::new(config, Arc::new(store), Arc::new(origin));

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
