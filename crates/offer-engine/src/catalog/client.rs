//! 课程目录服务客户端
//!
//! `CatalogQueryClient` 是对远程目录服务的抽象；`HttpCatalogClient` 是基于
//! reqwest 的实现，按请求上下文中的站点路由到对应的目录服务。

use async_trait::async_trait;
use metrics::counter;
use offer_shared::config::CatalogConfig;
use offer_shared::observability::metrics::{CATALOG_REQUEST_FAILURES, CATALOG_REQUESTS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use crate::context::RequestContext;
use crate::error::{OfferError, Result};
use crate::models::{Product, SEAT_PRODUCT_CLASS, Seat};

/// 目录查询结果：每个被询问的课程批次是否命中查询
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQueryResponse {
    pub course_runs: BTreeMap<String, bool>,
}

impl CatalogQueryResponse {
    pub fn contains(&self, course_id: &str) -> bool {
        self.course_runs.get(course_id).copied().unwrap_or(false)
    }
}

/// 命中查询的课程批次及其席位商品
#[derive(Debug, Clone, PartialEq)]
pub struct CourseRun {
    pub course_id: String,
    pub seat_products: Vec<Product>,
}

/// 目录服务接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQueryClient: Send + Sync {
    /// 查询给定课程批次是否命中目录查询
    async fn query(
        &self,
        ctx: &RequestContext,
        query: &str,
        course_ids: &[String],
    ) -> Result<CatalogQueryResponse>;

    /// 枚举命中目录查询的全部课程批次
    async fn course_runs(&self, ctx: &RequestContext, query: &str) -> Result<Vec<CourseRun>>;
}

// ==================== HTTP 实现 ====================

#[derive(Debug, Deserialize)]
struct CourseRunPage {
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    results: Vec<CourseRunRecord>,
}

#[derive(Debug, Deserialize)]
struct CourseRunRecord {
    key: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    seats: Vec<SeatRecord>,
}

#[derive(Debug, Deserialize)]
struct SeatRecord {
    product_id: i64,
    #[serde(rename = "type")]
    seat_type: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    id_verification_required: bool,
    #[serde(default)]
    credit_provider: Option<String>,
    #[serde(default)]
    credit_hours: Option<u32>,
}

impl CourseRunRecord {
    fn into_course_run(self) -> CourseRun {
        let course_title = self.title.unwrap_or_else(|| self.key.clone());
        let seat_products = self
            .seats
            .into_iter()
            .map(|seat| Product {
                id: seat.product_id,
                title: seat.title.unwrap_or_else(|| {
                    format!("Seat in {} with {} certificate", course_title, seat.seat_type)
                }),
                product_class: SEAT_PRODUCT_CLASS.to_string(),
                seat: Some(Seat {
                    course_id: self.key.clone(),
                    seat_type: seat.seat_type,
                    id_verification_required: seat.id_verification_required,
                    credit_provider: seat.credit_provider,
                    credit_hours: seat.credit_hours,
                }),
            })
            .collect();

        CourseRun {
            course_id: self.key,
            seat_products,
        }
    }
}

/// 基于 HTTP 的目录服务客户端
///
/// 超时由客户端统一设置，超时与其他传输错误一样以 `ServiceUnavailable` 返回。
#[derive(Clone)]
pub struct HttpCatalogClient {
    http: reqwest::Client,
    config: CatalogConfig,
}

impl HttpCatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| OfferError::Configuration(format!("无法创建目录服务 HTTP 客户端: {}", e)))?;
        Ok(Self { http, config })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        counter!(CATALOG_REQUESTS).increment(1);

        let result = async {
            request
                .bearer_auth(&ctx.auth_token)
                .send()
                .await?
                .error_for_status()?
                .json::<T>()
                .await
        }
        .await;

        result.map_err(|e| {
            counter!(CATALOG_REQUEST_FAILURES).increment(1);
            warn!(
                site = %ctx.site.domain,
                timeout = e.is_timeout(),
                status = ?e.status(),
                error = %e,
                "目录服务请求失败"
            );
            OfferError::catalog_unavailable(e.to_string())
        })
    }
}

#[async_trait]
impl CatalogQueryClient for HttpCatalogClient {
    #[instrument(skip(self, ctx), fields(site = %ctx.site.domain))]
    async fn query(
        &self,
        ctx: &RequestContext,
        query: &str,
        course_ids: &[String],
    ) -> Result<CatalogQueryResponse> {
        let url = format!("{}/course_runs/contains/", ctx.catalog_api_url()?);
        let request = self.http.get(&url).query(&[
            ("query", query.to_string()),
            ("course_run_ids", course_ids.join(",")),
        ]);
        self.get_json(ctx, request).await
    }

    #[instrument(skip(self, ctx), fields(site = %ctx.site.domain))]
    async fn course_runs(&self, ctx: &RequestContext, query: &str) -> Result<Vec<CourseRun>> {
        let url = format!("{}/course_runs/", ctx.catalog_api_url()?);
        let mut request = self.http.get(&url).query(&[
            ("q", query.to_string()),
            ("page_size", self.config.page_size.to_string()),
        ]);

        let mut runs = Vec::new();
        let mut pages = 0;
        loop {
            let page: CourseRunPage = self.get_json(ctx, request).await?;
            pages += 1;
            runs.extend(page.results.into_iter().map(CourseRunRecord::into_course_run));

            match page.next {
                Some(next) if pages < self.config.max_pages => {
                    request = self.http.get(next);
                }
                Some(_) => {
                    warn!(pages, "目录查询结果分页超过上限，截断剩余结果");
                    break;
                }
                None => break,
            }
        }

        debug!(pages, runs = runs.len(), "目录查询课程批次枚举完成");
        Ok(runs)
    }
}
