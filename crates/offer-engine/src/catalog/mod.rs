//! 课程目录查询
//!
//! - `client`: 目录服务接口与 HTTP 实现
//! - `lookup`: 带缓存的命中查询

pub mod client;
pub mod lookup;

pub use client::{CatalogQueryClient, CatalogQueryResponse, CourseRun, HttpCatalogClient};
pub use lookup::{CatalogQueryLookup, catalog_query_cache_key};
