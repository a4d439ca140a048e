use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use flickr_api_proxy::{
    AppState,
    cache::RedisCacheStore,
    config::Config,
    routes,
    upstream::{MinIntervalThrottle, UpstreamForwarder},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置 Redis 缓存存储，启动前确认可达
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");
    let store = RedisCacheStore::new(redis_client);
    store.ping().await.expect("Failed to connect to Redis");

    // 设置上游客户端与全局节流
    let upstream = UpstreamForwarder::new(config.upstream_base_url.clone())
        .expect("Failed to build upstream client");
    let throttle = Arc::new(MinIntervalThrottle::new(Duration::from_secs(1)));

    // 设置应用状态
    let state = AppState {
        store: Arc::new(store),
        throttle,
        upstream,
    };

    // 创建路由
    let router = routes::create_router(state);

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        // 设置开发环境的CORS，允许所有来源
        let cors = tower_http::cors::CorsLayer::permissive();
        router.layer(cors)
    };

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
