use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{
        Request, StatusCode,
        header::{self, HeaderValue},
    },
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use crate::{AppState, cache::CachedResponse, cache::keys, error::AppError};

/// 缓存条目的固定过期时间，由存储自行删除到期条目
pub const CACHE_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// 代理请求处理器
///
/// 校验凭证后用派生键查缓存；命中直接返回，未命中经全局节流放行后
/// 转发上游，写入缓存成功才把响应返回给客户端。
#[axum::debug_handler]
pub async fn proxy_request(
    State(state): State<AppState>,
    req: Request<Body>,
) -> Result<Response, AppError> {
    // 从连接信息获取调用方地址
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let path = req.uri().path().to_string();
    let raw_query = req.uri().query().unwrap_or("").to_string();

    info!("Request from {} for {}?{}", remote_addr, path, raw_query);

    // 只检查凭证存在性，有效性由上游判定
    let api_key = match req
        .headers()
        .get("X-API-Key")
        .and_then(|value| value.to_str().ok())
    {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => {
            warn!("Rejecting request from {} without X-API-Key", remote_addr);
            return Err(AppError::MissingApiKey);
        }
    };

    let query = parse_query(&raw_query);
    let cache_key = keys::response_cache_key(&api_key, &path, &query);

    // 检查缓存
    let cached = match state.store.get(&cache_key).await {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to lookup {} in cache: {}", cache_key, e);
            return Err(AppError::CacheLookupFailed);
        }
    };

    // 空值与键不存在同样视为未命中
    if let Some(value) = cached.filter(|value| !value.is_empty()) {
        let entry = match CachedResponse::decode(&value) {
            Ok(entry) => entry,
            Err(e) => {
                error!("Failed to parse cached response for {}: {}", cache_key, e);
                return Err(AppError::MalformedCacheEntry);
            }
        };
        info!("Cache hit for {}", cache_key);
        let CachedResponse { content_type, body } = entry;
        return Ok(content_response(&content_type, body));
    }

    info!("Cache miss for {}", cache_key);

    // 只有未命中才消耗全局节流配额
    if !state.throttle.try_admit() {
        warn!("Rejecting request for {}, too fast", cache_key);
        return Err(AppError::TooManyRequests);
    }

    // 转发上游
    let upstream = match state.upstream.forward(&api_key, &path, &query).await {
        Ok(response) => response,
        Err(e) => {
            error!("Failed to reach upstream for {}: {}", cache_key, e);
            return Err(AppError::UpstreamRequestFailed(e.to_string()));
        }
    };

    if upstream.status != StatusCode::OK {
        warn!(
            "Upstream returned HTTP status {} for {}",
            upstream.status, cache_key
        );
        return Err(AppError::UpstreamRejected(upstream.status));
    }

    // 先写缓存，写入成功才返回响应体
    let entry = CachedResponse::new(upstream.content_type, upstream.body);
    let value = match entry.encode() {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to encode response for {}: {}", cache_key, e);
            return Err(AppError::CacheWriteFailed);
        }
    };
    if let Err(e) = state.store.set_ex(&cache_key, value, CACHE_EXPIRY).await {
        error!("Failed to cache response for {}: {}", cache_key, e);
        return Err(AppError::CacheWriteFailed);
    }

    info!("Received response from upstream, returning to client");

    let CachedResponse { content_type, body } = entry;
    Ok(content_response(&content_type, body))
}

/// 把原始查询串解析为键值对，保留重复键
///
/// 百分号编码按 UTF-8 解码，无效字节落为替换字符后参与键派生和转发。
fn parse_query(raw_query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw_query.as_bytes())
        .into_owned()
        .collect()
}

/// 构造 200 响应；空内容类型不产生 Content-Type 头
fn content_response(content_type: &str, body: Vec<u8>) -> Response {
    let mut builder = Response::builder().status(StatusCode::OK);
    if !content_type.is_empty() {
        if let Ok(value) = HeaderValue::from_str(content_type) {
            builder = builder.header(header::CONTENT_TYPE, value);
        }
    }
    builder
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
