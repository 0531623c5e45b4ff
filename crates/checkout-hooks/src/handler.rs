//! 下单后处理器 Trait 定义

use async_trait::async_trait;

use crate::error::Result;
use crate::order::Order;

/// 下单后处理器
///
/// 订单完成后由结账流程按注册顺序调用，每个处理器只读访问订单。
/// 返回错误不会影响其他处理器，也不会影响订单本身。
#[async_trait]
pub trait PostCheckoutHandler: Send + Sync {
    /// 处理器名称，用于日志和结果报告
    fn name(&self) -> &'static str;

    async fn handle(&self, order: &Order) -> Result<()>;
}
