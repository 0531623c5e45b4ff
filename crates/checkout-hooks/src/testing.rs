//! 测试工具模块
//!
//! 提供示例订单和记录型的外部协作方实现，便于断言投递内容。

use async_trait::async_trait;
use chrono::Utc;
use offer_engine::{Product, Site};
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::error::{HookError, Result};
use crate::notification::{AnalyticsEvent, Notification, ReceiptEmail};
use crate::order::{Customer, Order, OrderLine, TrackingContext};
use crate::ports::{AnalyticsClient, CreditProvider, CreditProviderDirectory, Mailer, Notifier};

/// 单行已付款订单：一个 verified 席位，49.00 USD
pub fn sample_order() -> Order {
    Order {
        number: "EDX-100001".to_string(),
        site: Site::new("shop.example.com").with_lms_url("https://lms.example.com"),
        customer: Customer {
            id: 42,
            email: "learner@example.com".to_string(),
            full_name: "Ada Learner".to_string(),
            payment_email: None,
            tracking_context: TrackingContext::default(),
        },
        currency: "USD".to_string(),
        total_excl_tax: 4900,
        lines: vec![OrderLine {
            partner_sku: "SKU-VERIFIED".to_string(),
            product: Product::seat(
                100,
                "Seat in Demo Course with verified certificate",
                "course-v1:edX+DemoX+Demo_Course",
                "verified",
            ),
            quantity: 1,
            line_price_excl_tax: 4900,
        }],
        placed_at: Utc::now(),
    }
}

/// 记录全部埋点事件
#[derive(Default)]
pub struct RecordingAnalytics {
    events: Mutex<Vec<AnalyticsEvent>>,
    failing: Mutex<bool>,
}

impl RecordingAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl AnalyticsClient for RecordingAnalytics {
    async fn track(&self, event: &AnalyticsEvent) -> Result<()> {
        if *self.failing.lock() {
            return Err(HookError::delivery("analytics", "analytics backend unavailable"));
        }
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// 记录全部已发送邮件
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<ReceiptEmail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<ReceiptEmail> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &ReceiptEmail) -> Result<()> {
        self.sent.lock().push(email.clone());
        Ok(())
    }
}

/// 记录全部已投递通知
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

/// 固定内容的学分机构目录
#[derive(Default)]
pub struct StaticProviderDirectory {
    providers: HashMap<String, CreditProvider>,
}

impl StaticProviderDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, id: &str, display_name: &str) -> Self {
        self.providers.insert(
            id.to_string(),
            CreditProvider {
                id: id.to_string(),
                display_name: display_name.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl CreditProviderDirectory for StaticProviderDirectory {
    async fn get_provider(&self, provider_id: &str) -> Result<Option<CreditProvider>> {
        Ok(self.providers.get(provider_id).cloned())
    }
}
