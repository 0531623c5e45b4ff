//! 购买收据通知
//!
//! 只支持单行订单。无学分机构的席位发送普通收据，
//! 学分席位查询学分机构后发送学分收据。

use async_trait::async_trait;
use offer_engine::SEAT_PRODUCT_CLASS;
use offer_shared::config::CheckoutConfig;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{HookError, Result};
use crate::handler::PostCheckoutHandler;
use crate::notification::{Notification, NotificationType, ReceiptEmail};
use crate::order::{Order, OrderLine};
use crate::ports::{CreditProviderDirectory, Mailer, Notifier};

const TITLE_NOISE: [&str; 3] = [
    "Seat in ",
    " with professional certificate",
    " with verified certificate",
];

const DEFAULT_PROVIDER_NAME: &str = "Credit provider";

/// 从席位商品标题中提取课程名
///
/// `Seat in Demo Course with verified certificate` -> `Demo Course`
pub fn course_title_from(product_title: &str) -> String {
    TITLE_NOISE
        .iter()
        .fold(product_title.to_string(), |title, noise| title.replace(noise, ""))
        .trim()
        .to_string()
}

/// 下单后发送收据
pub struct ReceiptHandler {
    config: CheckoutConfig,
    mailer: Arc<dyn Mailer>,
    notifier: Arc<dyn Notifier>,
    providers: Arc<dyn CreditProviderDirectory>,
}

impl ReceiptHandler {
    pub fn new(
        config: CheckoutConfig,
        mailer: Arc<dyn Mailer>,
        notifier: Arc<dyn Notifier>,
        providers: Arc<dyn CreditProviderDirectory>,
    ) -> Self {
        Self {
            config,
            mailer,
            notifier,
            providers,
        }
    }

    fn receipt_page_url(&self, order: &Order) -> Result<String> {
        let path = format!("{}?orderNum={}", self.config.receipt_page_path, order.number);
        order.site.lms_url_for(&path).ok_or_else(|| {
            HookError::Configuration(format!("站点 {} 未配置学习平台地址", order.site.domain))
        })
    }

    fn notification(&self, order: &Order, receipt_url: String) -> Notification {
        Notification::new(
            order.customer.id,
            order.customer.email.clone(),
            NotificationType::CreditReceipt,
            order.site.domain.clone(),
        )
        .with_variable("receipt_page_url", receipt_url)
    }

    async fn send_course_receipt(&self, order: &Order, line: &OrderLine) -> Result<()> {
        let course_title = course_title_from(&line.product.title);
        let receipt_url = self.receipt_page_url(order)?;

        if order.customer.has_distinct_payment_email() {
            let email = ReceiptEmail {
                subject: self.config.receipt_subject.clone(),
                from: self.config.receipt_sender.clone(),
                to: vec![order.customer.email.clone()],
                full_name: order.customer.full_name.clone(),
                course_title: course_title.clone(),
                payment_email: order.customer.payment_email.clone().unwrap_or_default(),
            };
            self.mailer.send(&email).await?;
            debug!("支付邮箱与账户邮箱不同，已发送收据邮件");
        }

        let notification = self
            .notification(order, receipt_url)
            .with_variable("course_title", course_title)
            .with_variable("credit_hours", order.total_display())
            .with_variable("credit_provider", DEFAULT_PROVIDER_NAME);
        self.notifier.send(&notification).await
    }

    async fn send_credit_receipt(
        &self,
        order: &Order,
        line: &OrderLine,
        provider_id: &str,
    ) -> Result<()> {
        let Some(provider) = self.providers.get_provider(provider_id).await? else {
            warn!(provider_id, "未找到学分机构，跳过学分收据");
            return Ok(());
        };

        let credit_hours = line
            .product
            .seat
            .as_ref()
            .and_then(|seat| seat.credit_hours)
            .map(|hours| hours.to_string())
            .unwrap_or_default();

        let notification = self
            .notification(order, self.receipt_page_url(order)?)
            .with_variable("course_title", line.product.title.clone())
            .with_variable("credit_hours", credit_hours)
            .with_variable("credit_provider", provider.display_name);
        self.notifier.send(&notification).await
    }
}

#[async_trait]
impl PostCheckoutHandler for ReceiptHandler {
    fn name(&self) -> &'static str {
        "receipt"
    }

    #[instrument(skip_all, fields(order_number = %order.number))]
    async fn handle(&self, order: &Order) -> Result<()> {
        if !self.config.notifications_enabled {
            debug!("购买通知未开启，跳过");
            return Ok(());
        }

        let [line] = order.lines.as_slice() else {
            warn!(lines = order.lines.len(), "收据只支持单行订单，跳过");
            return Ok(());
        };

        match line.product.credit_provider() {
            None => self.send_course_receipt(order, line).await,
            Some(provider_id) if line.product.product_class == SEAT_PRODUCT_CLASS => {
                info!(provider_id, "发送学分收据");
                self.send_credit_receipt(order, line, provider_id).await
            }
            Some(_) => {
                debug!(product_class = %line.product.product_class, "非席位商品不发送学分收据");
                Ok(())
            }
        }
    }
}
