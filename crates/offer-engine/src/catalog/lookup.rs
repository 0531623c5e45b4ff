//! 目录查询缓存（cache-aside）
//!
//! 对 (查询语句, 课程批次) 的命中结果做缓存。缓存键是内容摘要，跨进程稳定；
//! 并发请求同时未命中时可能各自请求一次目录服务，以最后一次写入为准，不加锁。
//! 远程失败不写缓存。缓存自身读写失败只记录日志，不影响远程结果。

use metrics::counter;
use offer_shared::cache::{CacheStore, get_json, set_json};
use offer_shared::observability::metrics::{CATALOG_QUERY_CACHE_HITS, CATALOG_QUERY_CACHE_MISSES};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::client::{CatalogQueryClient, CatalogQueryResponse, CourseRun};
use crate::context::RequestContext;
use crate::error::Result;

/// 目录查询缓存键
///
/// 对 `catalog_query_contains [{query}] [{course_id}]` 计算 SHA256 十六进制摘要。
pub fn catalog_query_cache_key(query: &str, course_id: &str) -> String {
    let raw = format!("catalog_query_contains [{}] [{}]", query, course_id);
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 带缓存的目录查询
#[derive(Clone)]
pub struct CatalogQueryLookup {
    client: Arc<dyn CatalogQueryClient>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl CatalogQueryLookup {
    pub fn new(
        client: Arc<dyn CatalogQueryClient>,
        cache: Arc<dyn CacheStore>,
        ttl: Duration,
    ) -> Self {
        Self { client, cache, ttl }
    }

    /// 查询课程批次是否命中目录查询
    ///
    /// 缓存命中时原样返回缓存内容，不访问目录服务。
    #[instrument(skip(self, ctx))]
    pub async fn query_contains(
        &self,
        ctx: &RequestContext,
        query: &str,
        course_id: &str,
    ) -> Result<CatalogQueryResponse> {
        let key = catalog_query_cache_key(query, course_id);

        match get_json::<CatalogQueryResponse>(self.cache.as_ref(), &key).await {
            Ok(Some(cached)) => {
                counter!(CATALOG_QUERY_CACHE_HITS).increment(1);
                debug!(cache_key = %key, "目录查询缓存命中");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(cache_key = %key, error = %e, "读取目录查询缓存失败，按未命中处理");
            }
        }
        counter!(CATALOG_QUERY_CACHE_MISSES).increment(1);

        let response = self
            .client
            .query(ctx, query, &[course_id.to_string()])
            .await?;

        if let Err(e) = set_json(self.cache.as_ref(), &key, &response, self.ttl).await {
            warn!(cache_key = %key, error = %e, "写入目录查询缓存失败");
        }

        Ok(response)
    }

    /// 枚举命中查询的全部课程批次（不缓存，结果顺序由目录服务决定）
    pub async fn course_runs(&self, ctx: &RequestContext, query: &str) -> Result<Vec<CourseRun>> {
        self.client.course_runs(ctx, query).await
    }
}
