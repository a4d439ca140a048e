use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use thiserror::Error;

/// 缓存存储访问错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to cache store: {0}")]
    Connection(String),
    #[error("cache store command failed: {0}")]
    Command(String),
}

/// 外部键值存储的最小契约：按键读取，带过期时间写入
///
/// 过期由存储自身管理，代理不持有删除路径。
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    async fn set_ex(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError>;
}

/// Redis 实现
pub struct RedisCacheStore {
    client: Arc<RedisClient>,
}

impl RedisCacheStore {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// 启动时确认 Redis 可达
    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))?;

        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let _: () = conn
            .set_ex(key, value, ttl.as_secs())
            .await
            .map_err(|e| StoreError::Command(e.to_string()))?;

        Ok(())
    }
}
