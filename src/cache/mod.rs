// 缓存模块
// 包含缓存键派生、缓存值编解码与外部存储访问

pub mod keys;
pub mod model;
pub mod store;

// 重新导出常用类型和函数，方便其他模块使用
pub use model::{CachedResponse, CodecError};
pub use store::{CacheStore, RedisCacheStore, StoreError};
