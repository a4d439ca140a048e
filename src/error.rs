use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// 请求处理的终止性失败
///
/// 每个变体对应一个对客户端的单行纯文本响应；没有任何本地恢复或重试。
#[derive(Debug)]
pub enum AppError {
    /// 请求缺少 X-API-Key 头
    MissingApiKey,
    /// 缓存存储读取失败（键不存在不算失败）
    CacheLookupFailed,
    /// 存储中的缓存值无法解析
    MalformedCacheEntry,
    /// 被全局节流器拒绝，未接触上游
    TooManyRequests,
    /// 上游网络、超时或 DNS 失败，携带错误描述
    UpstreamRequestFailed(String),
    /// 上游返回非 200，状态码原样透传给客户端
    UpstreamRejected(StatusCode),
    /// 成功取回上游响应但写缓存失败
    CacheWriteFailed,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MissingApiKey => (StatusCode::UNAUTHORIZED, "missing X-API-Key".to_string()),
            AppError::CacheLookupFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "cache lookup failed".to_string(),
            ),
            AppError::MalformedCacheEntry => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to parse cached response".to_string(),
            ),
            AppError::TooManyRequests => (StatusCode::TOO_MANY_REQUESTS, "too fast".to_string()),
            AppError::UpstreamRequestFailed(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
            AppError::UpstreamRejected(status) => (status, status_line(status)),
            AppError::CacheWriteFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to cache response".to_string(),
            ),
        };

        (status, message).into_response()
    }
}

/// 形如 "404 Not Found" 的状态行文本
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn rendered(error: AppError) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn missing_api_key_renders_401() {
        let (status, body) = rendered(AppError::MissingApiKey).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "missing X-API-Key");
    }

    #[tokio::test]
    async fn throttle_rejection_renders_429() {
        let (status, body) = rendered(AppError::TooManyRequests).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, "too fast");
    }

    #[tokio::test]
    async fn upstream_rejection_passes_the_status_through() {
        let (status, body) = rendered(AppError::UpstreamRejected(StatusCode::NOT_FOUND)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "404 Not Found");
    }

    #[tokio::test]
    async fn transport_failure_carries_the_error_text() {
        let (status, body) =
            rendered(AppError::UpstreamRequestFailed("connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "connection refused");
    }
}
