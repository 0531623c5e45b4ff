//! 订单完成埋点

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::handler::PostCheckoutHandler;
use crate::notification::AnalyticsEvent;
use crate::order::{Order, format_amount};
use crate::ports::AnalyticsClient;

pub const COMPLETED_ORDER_EVENT: &str = "Completed Order";

/// 构造订单完成事件
pub fn completed_order_event(order: &Order) -> AnalyticsEvent {
    let products: Vec<Value> = order
        .lines
        .iter()
        .map(|line| {
            json!({
                "id": line.partner_sku,
                "sku": line.product.seat_mode(),
                "name": line.product.course_id().unwrap_or(&line.product.title),
                "price": format_amount(line.line_price_excl_tax),
                "quantity": line.quantity,
                "category": line.product.product_class,
            })
        })
        .collect();

    let tracking = &order.customer.tracking_context;
    AnalyticsEvent {
        user_id: order.customer.tracking_user_id(),
        event: COMPLETED_ORDER_EVENT.to_string(),
        properties: json!({
            "orderId": order.number,
            "total": order.total_display(),
            "currency": order.currency,
            "products": products,
        }),
        context: json!({
            "ip": tracking.lms_ip,
            "Google Analytics": {
                "clientId": tracking.lms_client_id,
            },
        }),
    }
}

/// 订单完成后上报埋点
pub struct TrackingHandler {
    client: Arc<dyn AnalyticsClient>,
    enabled: bool,
}

impl TrackingHandler {
    pub fn new(client: Arc<dyn AnalyticsClient>, enabled: bool) -> Self {
        Self { client, enabled }
    }
}

#[async_trait]
impl PostCheckoutHandler for TrackingHandler {
    fn name(&self) -> &'static str {
        "tracking"
    }

    #[instrument(skip_all, fields(order_number = %order.number))]
    async fn handle(&self, order: &Order) -> Result<()> {
        if !self.enabled {
            debug!("未配置埋点分析，跳过");
            return Ok(());
        }
        if order.total_excl_tax <= 0 {
            debug!("免费订单不上报埋点");
            return Ok(());
        }

        self.client.track(&completed_order_event(order)).await
    }
}
