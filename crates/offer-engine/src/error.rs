//! 优惠评估错误类型

use offer_shared::SharedError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OfferError {
    /// 缺少请求上下文或站点未配置目录服务，属于致命错误，不重试
    #[error("配置错误: {0}")]
    Configuration(String),

    /// 目录服务调用失败或超时，无法判定资格
    #[error("外部服务不可用: {service} - {message}")]
    ServiceUnavailable { service: String, message: String },

    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("缓存错误: {0}")]
    Cache(#[from] SharedError),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OfferError>;

impl OfferError {
    pub fn catalog_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: "catalog".to_string(),
            message: message.into(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// 是否为可重试错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}
