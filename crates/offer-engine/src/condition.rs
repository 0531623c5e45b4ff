//! 条件优惠评估

use tracing::{debug, instrument};

use crate::context::RequestContext;
use crate::error::Result;
use crate::membership::RangeMembership;
use crate::models::{Basket, Condition, ConditionalOffer};

/// 条件优惠评估器
#[derive(Clone)]
pub struct OfferCondition {
    membership: RangeMembership,
}

impl OfferCondition {
    pub fn new(membership: RangeMembership) -> Self {
        Self { membership }
    }

    pub fn membership(&self) -> &RangeMembership {
        &self.membership
    }

    /// 篮子是否满足优惠条件
    ///
    /// 先校验邮箱域名（不通过时不访问目录服务），再累加范围内商品的数量，
    /// 达到条件要求的数量即满足。成员判定的错误直接向上传递。
    #[instrument(skip_all, fields(offer_id = offer.id, basket_id = basket.id))]
    pub async fn is_condition_satisfied(
        &self,
        offer: &ConditionalOffer,
        basket: &Basket,
        ctx: Option<&RequestContext>,
    ) -> Result<bool> {
        if offer.has_email_restriction() {
            let valid = basket
                .owner_email()
                .is_some_and(|email| offer.is_email_valid(email));
            if !valid {
                debug!("篮子所有者邮箱域名不在允许列表中");
                return Ok(false);
            }
        }

        let matched = self.matching_quantity(&offer.condition, basket, ctx).await?;
        let required = u64::from(offer.condition.value);
        debug!(matched, required, "优惠条件评估完成");
        Ok(matched >= required)
    }

    /// 篮子中属于条件范围的商品总数量
    pub async fn matching_quantity(
        &self,
        condition: &Condition,
        basket: &Basket,
        ctx: Option<&RequestContext>,
    ) -> Result<u64> {
        let mut total = 0u64;
        for line in basket.lines() {
            if self
                .membership
                .contains(&condition.range, &line.product, ctx)
                .await?
            {
                total += u64::from(line.quantity);
            }
        }
        Ok(total)
    }
}
