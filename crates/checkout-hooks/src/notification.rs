//! 下单后发出的消息类型
//!
//! 只描述消息内容，模板渲染和投递由外部完成。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// 埋点事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub user_id: String,
    pub event: String,
    pub properties: Value,
    pub context: Value,
}

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    CreditReceipt,
}

/// 通知请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub notification_id: String,
    pub user_id: i64,
    pub email: String,
    pub notification_type: NotificationType,
    /// 模板变量
    pub variables: BTreeMap<String, String>,
    /// 发出通知的站点域名
    pub site: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: i64,
        email: impl Into<String>,
        notification_type: NotificationType,
        site: impl Into<String>,
    ) -> Self {
        Self {
            notification_id: Uuid::now_v7().to_string(),
            user_id,
            email: email.into(),
            notification_type,
            variables: BTreeMap::new(),
            site: site.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn variable(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }
}

/// 收据邮件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptEmail {
    pub subject: String,
    pub from: String,
    pub to: Vec<String>,
    pub full_name: String,
    pub course_title: String,
    pub payment_email: String,
}
