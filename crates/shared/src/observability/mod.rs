//! 统一可观测性模块
//!
//! 提供日志和指标的统一初始化。指标只通过 `metrics` 门面记录，
//! 具体的 recorder / exporter 由宿主进程安装。

pub mod metrics;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;

use crate::config::ObservabilityConfig;

/// 统一初始化可观测性
///
/// 初始化顺序：
/// 1. Tracing（日志）
/// 2. 指标描述注册
///
/// # Example
///
/// ```ignore
/// use offer_shared::config::AppConfig;
/// use offer_shared::observability;
///
/// let config = AppConfig::load("offer-engine")?;
/// observability::init(&config.service_name, &config.observability)?;
/// ```
pub fn init(service_name: &str, config: &ObservabilityConfig) -> Result<()> {
    tracing::init(config)?;
    metrics::describe_metrics();

    info!(
        service = %service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs(),
        "Observability initialized"
    );

    Ok(())
}
