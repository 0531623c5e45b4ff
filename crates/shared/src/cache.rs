//! 缓存存储模块
//!
//! 定义 `CacheStore` 抽象，并提供 Redis 与进程内两种实现。
//! 缓存只负责按 TTL 过期，不做主动失效；值统一以 JSON 字符串存储。

use crate::config::{CacheBackend, RedisConfig};
use crate::error::{Result, SharedError};
use async_trait::async_trait;
use dashmap::DashMap;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// 缓存存储接口
///
/// 由宿主环境提供，多个请求并发读写同一个 key 时以最后一次写入为准。
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

/// 读取并反序列化 JSON 值
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn CacheStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// 序列化为 JSON 后写入
pub async fn set_json<T: Serialize>(
    store: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Duration,
) -> Result<()> {
    let serialized = serde_json::to_string(value)?;
    store.set(key, &serialized, ttl).await
}

/// 按配置构建缓存存储
pub fn build_cache_store(
    backend: CacheBackend,
    redis: &RedisConfig,
) -> Result<Arc<dyn CacheStore>> {
    match backend {
        CacheBackend::Redis => Ok(Arc::new(RedisCache::new(redis)?)),
        CacheBackend::Memory => Ok(Arc::new(InMemoryCache::new())),
    }
}

/// Redis 缓存客户端
#[derive(Clone)]
pub struct RedisCache {
    client: Client,
}

impl RedisCache {
    /// 创建 Redis 客户端
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        info!("Redis client created");
        Ok(Self { client })
    }

    async fn get_conn(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(SharedError::from)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.get_conn().await?;
        // SET EX 不接受 0，至少保留 1 秒
        let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }
}

/// 进程内 TTL 缓存
///
/// 基于 DashMap，条目在访问时惰性淘汰。适用于测试和单实例部署。
#[derive(Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<DashMap<String, (String, Instant, Duration)>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前条目数（包括尚未淘汰的过期条目）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(entry) = self.entries.get(key) {
            let (value, inserted, ttl) = entry.value();
            if inserted.elapsed() < *ttl {
                return Ok(Some(value.clone()));
            }
            // 先释放读锁再删除
            drop(entry);
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries
            .insert(key.to_string(), (value.to_string(), Instant::now(), ttl));
        Ok(())
    }
}
