//! 购物篮模型

use serde::{Deserialize, Serialize};

use super::product::Product;

/// 篮子所有者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketOwner {
    pub user_id: i64,
    pub email: String,
}

/// 篮子行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketLine {
    pub product: Product,
    pub quantity: u32,
}

/// 购物篮
///
/// 评估优惠条件时只读。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    pub id: i64,
    #[serde(default)]
    pub owner: Option<BasketOwner>,
    #[serde(default)]
    lines: Vec<BasketLine>,
}

impl Basket {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            owner: None,
            lines: Vec::new(),
        }
    }

    pub fn for_owner(id: i64, user_id: i64, email: impl Into<String>) -> Self {
        Self {
            id,
            owner: Some(BasketOwner {
                user_id,
                email: email.into(),
            }),
            lines: Vec::new(),
        }
    }

    /// 加入商品，已有的商品累加数量（上限为 `u32::MAX`）
    pub fn add_product(&mut self, product: Product, quantity: u32) {
        match self.lines.iter_mut().find(|l| l.product == product) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(BasketLine { product, quantity }),
        }
    }

    pub fn lines(&self) -> &[BasketLine] {
        &self.lines
    }

    pub fn num_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn owner_email(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.email.as_str())
    }
}
