use axum::{Router, routing::get};

use crate::AppState;
use crate::middleware::log_errors;

pub mod proxy;

// 创建主路由：任意路径上的 GET 都交给代理处理器
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(proxy::proxy_request))
        .route("/{*path}", get(proxy::proxy_request))
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
