//! 共享库
//!
//! 包含优惠评估与下单后处理共用的配置、错误处理、缓存、可观测性等基础设施代码。

pub mod cache;
pub mod config;
pub mod error;
pub mod observability;

pub use cache::{CacheStore, InMemoryCache, RedisCache};
pub use error::{Result, SharedError};
