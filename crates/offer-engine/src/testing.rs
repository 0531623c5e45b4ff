//! 测试工具模块
//!
//! 提供内存版目录服务，记录调用次数，便于集成测试断言远程调用行为。

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::catalog::{CatalogQueryClient, CatalogQueryResponse, CourseRun};
use crate::context::{RequestContext, Site};
use crate::error::{OfferError, Result};

/// 创建测试用请求上下文
pub fn test_context() -> RequestContext {
    RequestContext::new(
        Site::new("shop.example.com")
            .with_catalog_api_url("https://catalog.example.com/api/v1")
            .with_lms_url("https://lms.example.com"),
        "test-token",
    )
}

/// 内存版目录服务
///
/// 每个查询语句对应一组课程批次；可以设置失败模式和响应延迟。
#[derive(Default)]
pub struct InMemoryCatalog {
    runs: Mutex<HashMap<String, Vec<CourseRun>>>,
    failing: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
    query_calls: AtomicUsize,
    course_runs_calls: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册查询语句命中的课程批次
    pub fn with_query(self, query: &str, runs: Vec<CourseRun>) -> Self {
        self.runs.lock().insert(query.to_string(), runs);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn course_runs_calls(&self) -> usize {
        self.course_runs_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) -> Result<()> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.failing.lock() {
            return Err(OfferError::catalog_unavailable("simulated outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogQueryClient for InMemoryCatalog {
    async fn query(
        &self,
        _ctx: &RequestContext,
        query: &str,
        course_ids: &[String],
    ) -> Result<CatalogQueryResponse> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await?;

        let runs = self.runs.lock();
        let matched = runs.get(query);
        let mut response = CatalogQueryResponse::default();
        for id in course_ids {
            let hit = matched.is_some_and(|runs| runs.iter().any(|r| &r.course_id == id));
            response.course_runs.insert(id.clone(), hit);
        }
        Ok(response)
    }

    async fn course_runs(&self, _ctx: &RequestContext, query: &str) -> Result<Vec<CourseRun>> {
        self.course_runs_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await?;

        Ok(self.runs.lock().get(query).cloned().unwrap_or_default())
    }
}
