//! 下单后处理错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("投递失败: {channel} - {message}")]
    Delivery { channel: String, message: String },

    #[error("配置错误: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, HookError>;

impl HookError {
    pub fn delivery(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delivery {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Delivery { .. } => "DELIVERY_FAILED",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}
