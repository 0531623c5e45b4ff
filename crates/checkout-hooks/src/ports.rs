//! 外部协作方接口
//!
//! 埋点、邮件、通知投递以及学分机构查询都由宿主环境实现，这里只定义接口。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::notification::{AnalyticsEvent, Notification, ReceiptEmail};

/// 学分机构信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditProvider {
    pub id: String,
    pub display_name: String,
}

/// 埋点分析客户端
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsClient: Send + Sync {
    async fn track(&self, event: &AnalyticsEvent) -> Result<()>;
}

/// 邮件发送
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &ReceiptEmail) -> Result<()>;
}

/// 通知投递
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// 学分机构目录
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CreditProviderDirectory: Send + Sync {
    async fn get_provider(&self, provider_id: &str) -> Result<Option<CreditProvider>>;
}
