//! 下单后处理
//!
//! 订单完成后按固定顺序执行的处理器：订单完成埋点和购买收据通知。
//! 外部投递（埋点、邮件、通知、学分机构查询）通过 `ports` 中的接口注入。

pub mod error;
pub mod handler;
pub mod handlers;
pub mod notification;
pub mod order;
pub mod pipeline;
pub mod ports;
pub mod testing;

pub use error::{HookError, Result};
pub use handler::PostCheckoutHandler;
pub use handlers::{ReceiptHandler, TrackingHandler};
pub use notification::{AnalyticsEvent, Notification, NotificationType, ReceiptEmail};
pub use order::{Customer, Order, OrderLine, TrackingContext};
pub use pipeline::{DispatchReport, HandlerOutcome, HandlerPipeline};
pub use ports::{AnalyticsClient, CreditProvider, CreditProviderDirectory, Mailer, Notifier};
