//! 内置的下单后处理器

mod receipt;
mod tracking;

pub use receipt::{ReceiptHandler, course_title_from};
pub use tracking::{COMPLETED_ORDER_EVENT, TrackingHandler, completed_order_event};
