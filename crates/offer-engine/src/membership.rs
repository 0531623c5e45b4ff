//! 范围成员判定
//!
//! 判断单个商品是否属于某个优惠范围，以及枚举范围内的全部商品。
//! 显式商品列表和静态目录在本地判定；目录查询范围需要请求上下文并访问目录服务。

use offer_shared::cache::build_cache_store;
use offer_shared::config::AppConfig;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::catalog::{CatalogQueryClient, CatalogQueryLookup, HttpCatalogClient};
use crate::context::{RequestContext, require_context};
use crate::error::Result;
use crate::models::{Product, Range, RangeSource};

/// 范围成员判定器
#[derive(Clone)]
pub struct RangeMembership {
    lookup: CatalogQueryLookup,
}

impl RangeMembership {
    pub fn new(lookup: CatalogQueryLookup) -> Self {
        Self { lookup }
    }

    /// 按应用配置装配：HTTP 目录客户端 + 配置的缓存后端
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client: Arc<dyn CatalogQueryClient> =
            Arc::new(HttpCatalogClient::new(config.catalog.clone())?);
        let cache = build_cache_store(config.cache.backend, &config.redis)?;
        Ok(Self::new(CatalogQueryLookup::new(
            client,
            cache,
            config.cache.catalog_query_ttl(),
        )))
    }

    pub fn lookup(&self) -> &CatalogQueryLookup {
        &self.lookup
    }

    /// 判断商品是否属于范围
    ///
    /// 目录查询范围下，席位类型不在允许列表中的商品直接返回 false，不访问目录服务；
    /// 真正需要查询时若没有请求上下文，返回配置错误。
    #[instrument(skip_all, fields(range_id = range.id, product_id = product.id))]
    pub async fn contains(
        &self,
        range: &Range,
        product: &Product,
        ctx: Option<&RequestContext>,
    ) -> Result<bool> {
        match range.source() {
            RangeSource::Explicit(products) => Ok(products.contains(product)),
            RangeSource::Static(catalog) => Ok(catalog.contains_product(product)),
            RangeSource::Query { query, seat_types } => {
                if query.trim().is_empty() {
                    return Ok(false);
                }
                let Some(seat) = product.seat.as_ref() else {
                    return Ok(false);
                };
                if !seat_types.allows(&seat.seat_type) {
                    debug!(seat_type = %seat.seat_type, "席位类型不在范围允许列表中");
                    return Ok(false);
                }

                let ctx = require_context(ctx)?;
                let response = self
                    .lookup
                    .query_contains(ctx, query, &seat.course_id)
                    .await?;
                Ok(response.contains(&seat.course_id))
            }
        }
    }

    /// 范围内的全部商品
    ///
    /// 显式列表按加入顺序，静态目录按库存记录顺序；
    /// 目录查询范围按目录服务返回的顺序，调用方不应依赖该顺序。
    #[instrument(skip_all, fields(range_id = range.id))]
    pub async fn all_products(
        &self,
        range: &Range,
        ctx: Option<&RequestContext>,
    ) -> Result<Vec<Product>> {
        match range.source() {
            RangeSource::Explicit(products) => Ok(products.clone()),
            RangeSource::Static(catalog) => Ok(catalog.products()),
            RangeSource::Query { query, seat_types } => {
                if query.trim().is_empty() {
                    return Ok(Vec::new());
                }
                let ctx = require_context(ctx)?;
                let runs = self.lookup.course_runs(ctx, query).await?;

                let mut products: Vec<Product> = Vec::new();
                for seat in runs.into_iter().flat_map(|run| run.seat_products) {
                    let allowed = seat.seat_type().is_some_and(|t| seat_types.allows(t));
                    if allowed && !products.contains(&seat) {
                        products.push(seat);
                    }
                }
                debug!(count = products.len(), "目录查询范围商品枚举完成");
                Ok(products)
            }
        }
    }

    /// 范围内商品数量，与 `all_products` 的长度一致
    pub async fn num_products(&self, range: &Range, ctx: Option<&RequestContext>) -> Result<usize> {
        Ok(self.all_products(range, ctx).await?.len())
    }
}
