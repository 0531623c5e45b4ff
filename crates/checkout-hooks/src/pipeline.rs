//! 下单后处理流水线
//!
//! 按注册顺序依次调用处理器。单个处理器失败只记录日志和指标，
//! 不中断后续处理器，也不会把错误返回给结账流程。

use offer_shared::config::CheckoutConfig;
use offer_shared::observability::metrics::CHECKOUT_HANDLER_FAILURES;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::handler::PostCheckoutHandler;
use crate::handlers::{ReceiptHandler, TrackingHandler};
use crate::order::Order;
use crate::ports::{AnalyticsClient, CreditProviderDirectory, Mailer, Notifier};

/// 单个处理器的执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    Completed,
    Failed { code: &'static str, message: String },
}

/// 一次分发的执行报告，顺序与注册顺序一致
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<(&'static str, HandlerOutcome)>,
}

impl DispatchReport {
    pub fn failed(&self) -> Vec<&'static str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, HandlerOutcome::Failed { .. }))
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn all_completed(&self) -> bool {
        self.failed().is_empty()
    }
}

/// 有序的处理器列表
#[derive(Clone, Default)]
pub struct HandlerPipeline {
    handlers: Vec<Arc<dyn PostCheckoutHandler>>,
}

impl HandlerPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加处理器，调用顺序即注册顺序
    pub fn register(&mut self, handler: Arc<dyn PostCheckoutHandler>) -> &mut Self {
        debug!(handler = handler.name(), "注册下单后处理器");
        self.handlers.push(handler);
        self
    }

    /// 标准流水线：先埋点，再发送收据
    pub fn standard(
        config: &CheckoutConfig,
        analytics: Arc<dyn AnalyticsClient>,
        mailer: Arc<dyn Mailer>,
        notifier: Arc<dyn Notifier>,
        providers: Arc<dyn CreditProviderDirectory>,
    ) -> Self {
        let mut pipeline = Self::new();
        pipeline
            .register(Arc::new(TrackingHandler::new(
                analytics,
                config.analytics_enabled,
            )))
            .register(Arc::new(ReceiptHandler::new(
                config.clone(),
                mailer,
                notifier,
                providers,
            )));

        info!(
            handler_count = pipeline.len(),
            handlers = ?pipeline.names(),
            "下单后处理流水线初始化完成"
        );
        pipeline
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// 依次执行全部处理器
    #[instrument(skip_all, fields(order_number = %order.number))]
    pub async fn dispatch(&self, order: &Order) -> DispatchReport {
        let mut report = DispatchReport::default();

        for handler in &self.handlers {
            let name = handler.name();
            let outcome = match handler.handle(order).await {
                Ok(()) => HandlerOutcome::Completed,
                Err(e) => {
                    error!(handler = name, error = %e, code = e.code(), "下单后处理器执行失败");
                    metrics::counter!(CHECKOUT_HANDLER_FAILURES, "handler" => name).increment(1);
                    HandlerOutcome::Failed {
                        code: e.code(),
                        message: e.to_string(),
                    }
                }
            };
            report.outcomes.push((name, outcome));
        }

        debug!(failed = ?report.failed(), "下单后处理完成");
        report
    }
}
