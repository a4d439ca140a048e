use std::sync::Arc;

use cache::CacheStore;
use upstream::{AdmissionControl, UpstreamForwarder};

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod upstream;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CacheStore>,
    pub throttle: Arc<dyn AdmissionControl>,
    pub upstream: UpstreamForwarder,
}
