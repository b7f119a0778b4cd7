pub mod config;
pub mod origin;
pub mod proxy;
pub mod s3;
pub mod store;
pub mod types;

use config::Config;
use origin::Origin;
use std::sync::Arc;
use store::BlobStore;

/// Shared application state, built once per cold start
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn BlobStore>,
    pub origin: Arc<dyn Origin>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn BlobStore>, origin: Arc<dyn Origin>) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            origin,
        })
    }
}
