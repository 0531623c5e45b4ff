//! 指标定义
//!
//! 统一维护指标名称，业务代码通过 `metrics::counter!` 记录。

pub const CATALOG_QUERY_CACHE_HITS: &str = "catalog_query_cache_hits_total";
pub const CATALOG_QUERY_CACHE_MISSES: &str = "catalog_query_cache_misses_total";
pub const CATALOG_REQUESTS: &str = "catalog_requests_total";
pub const CATALOG_REQUEST_FAILURES: &str = "catalog_request_failures_total";
pub const CHECKOUT_HANDLER_FAILURES: &str = "checkout_handler_failures_total";

/// 注册指标描述（出现在 exporter 的 HELP 注释中）
pub fn describe_metrics() {
    metrics::describe_counter!(
        CATALOG_QUERY_CACHE_HITS,
        "Catalog query lookups answered from cache"
    );
    metrics::describe_counter!(
        CATALOG_QUERY_CACHE_MISSES,
        "Catalog query lookups that required a remote call"
    );
    metrics::describe_counter!(CATALOG_REQUESTS, "Requests sent to the catalog service");
    metrics::describe_counter!(
        CATALOG_REQUEST_FAILURES,
        "Catalog service requests that failed or timed out"
    );
    metrics::describe_counter!(
        CHECKOUT_HANDLER_FAILURES,
        "Post-checkout handlers that returned an error"
    );
}
