//! 条件优惠模型

use serde::{Deserialize, Serialize};

use super::range::Range;

/// 优惠条件：范围 + 所需数量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub range: Range,
    /// 篮子中范围内商品的最小总数量
    pub value: u32,
}

impl Condition {
    pub fn new(range: Range, value: u32) -> Self {
        Self { range, value }
    }
}

/// 权益类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitKind {
    Percentage,
    Absolute,
    FixedPrice,
}

/// 优惠权益（只作为数据携带，折扣计算不在本模块）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benefit {
    pub kind: BenefitKind,
    pub value: f64,
}

impl Benefit {
    pub fn percentage(value: f64) -> Self {
        Self {
            kind: BenefitKind::Percentage,
            value,
        }
    }
}

/// 条件优惠
///
/// 管理端创建，结账时按篮子评估，评估过程不会修改它。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalOffer {
    pub id: i64,
    pub name: String,
    pub condition: Condition,
    pub benefit: Benefit,
    /// 逗号分隔的允许邮箱域名
    #[serde(default)]
    pub email_domains: Option<String>,
}

impl ConditionalOffer {
    pub fn new(id: i64, name: impl Into<String>, condition: Condition, benefit: Benefit) -> Self {
        Self {
            id,
            name: name.into(),
            condition,
            benefit,
            email_domains: None,
        }
    }

    pub fn with_email_domains(mut self, domains: impl Into<String>) -> Self {
        self.email_domains = Some(domains.into());
        self
    }

    /// 配置的邮箱域名（去掉空白和空项）
    pub fn accepted_domains(&self) -> impl Iterator<Item = &str> {
        self.email_domains
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    pub fn has_email_restriction(&self) -> bool {
        self.accepted_domains().next().is_some()
    }

    /// 校验邮箱域名
    ///
    /// 未配置域名时总是通过；否则取最后一个 `@` 之后的部分，
    /// 与配置的某个域名完全相等（区分大小写）才通过。
    pub fn is_email_valid(&self, email: &str) -> bool {
        if !self.has_email_restriction() {
            return true;
        }
        match email.rsplit_once('@') {
            Some((_, domain)) => self.accepted_domains().any(|d| d == domain),
            None => false,
        }
    }
}
