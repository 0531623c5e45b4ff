//! 已完成订单模型
//!
//! 金额统一以最小货币单位（分）存储。

use chrono::{DateTime, Utc};
use offer_engine::{Product, Site};
use serde::{Deserialize, Serialize};

/// 学习平台传来的埋点上下文
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingContext {
    #[serde(default)]
    pub lms_user_id: Option<String>,
    #[serde(default)]
    pub lms_client_id: Option<String>,
    #[serde(default)]
    pub lms_ip: Option<String>,
}

/// 下单用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    /// 支付时填写的邮箱，可能与账户邮箱不同
    #[serde(default)]
    pub payment_email: Option<String>,
    #[serde(default)]
    pub tracking_context: TrackingContext,
}

impl Customer {
    /// 埋点用的用户标识，没有学习平台用户 ID 时回退为 `ecommerce-{id}`
    pub fn tracking_user_id(&self) -> String {
        self.tracking_context
            .lms_user_id
            .clone()
            .unwrap_or_else(|| format!("ecommerce-{}", self.id))
    }

    /// 支付邮箱是否与账户邮箱不同
    pub fn has_distinct_payment_email(&self) -> bool {
        self.payment_email
            .as_deref()
            .is_some_and(|e| !e.is_empty() && e != self.email)
    }
}

/// 订单行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub partner_sku: String,
    pub product: Product,
    pub quantity: u32,
    pub line_price_excl_tax: i64,
}

/// 已完成的订单
///
/// 下单后处理器只读访问订单。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub number: String,
    pub site: Site,
    pub customer: Customer,
    pub currency: String,
    pub total_excl_tax: i64,
    pub lines: Vec<OrderLine>,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    pub fn total_display(&self) -> String {
        format_amount(self.total_excl_tax)
    }
}

/// 将分格式化为两位小数的字符串，如 `12345 -> "123.45"`
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
