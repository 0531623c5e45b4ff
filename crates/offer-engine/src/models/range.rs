//! 优惠范围模型
//!
//! 范围的成员关系只能来自一种来源：显式商品列表、静态目录或动态目录查询。
//! 管理端提交的扁平配置（`RangeDefinition`）在转换为 `Range` 时做校验，
//! 同时配置多种来源会被拒绝，而不是按优先级静默选择其中一种。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::product::{Catalog, Product};
use crate::error::{OfferError, Result};

/// 席位类型过滤器
///
/// 为空表示不过滤。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatTypeFilter(BTreeSet<String>);

impl SeatTypeFilter {
    /// 解析逗号分隔的席位类型，如 `"verified, professional"`
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn allows(&self, seat_type: &str) -> bool {
        self.is_empty() || self.0.contains(&seat_type.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// 还原为逗号分隔的字符串
    pub fn to_config_string(&self) -> String {
        self.iter().collect::<Vec<_>>().join(",")
    }
}

/// 范围成员来源
#[derive(Debug, Clone, PartialEq)]
pub enum RangeSource {
    /// 显式商品列表（按加入顺序）
    Explicit(Vec<Product>),
    /// 静态目录
    Static(Catalog),
    /// 动态目录查询
    Query {
        query: String,
        seat_types: SeatTypeFilter,
    },
}

/// 优惠范围
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RangeDefinition", into = "RangeDefinition")]
pub struct Range {
    pub id: i64,
    pub name: String,
    source: RangeSource,
}

impl Range {
    /// 空范围，不包含任何商品
    pub fn empty(id: i64, name: impl Into<String>) -> Self {
        Self::explicit(id, name, Vec::new())
    }

    /// 显式商品范围，重复的商品只保留第一次出现
    pub fn explicit(id: i64, name: impl Into<String>, products: Vec<Product>) -> Self {
        let mut unique: Vec<Product> = Vec::with_capacity(products.len());
        for product in products {
            if !unique.contains(&product) {
                unique.push(product);
            }
        }
        Self {
            id,
            name: name.into(),
            source: RangeSource::Explicit(unique),
        }
    }

    pub fn with_catalog(id: i64, name: impl Into<String>, catalog: Catalog) -> Self {
        Self {
            id,
            name: name.into(),
            source: RangeSource::Static(catalog),
        }
    }

    pub fn with_query(
        id: i64,
        name: impl Into<String>,
        query: impl Into<String>,
        seat_types: &str,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            source: RangeSource::Query {
                query: query.into(),
                seat_types: SeatTypeFilter::parse(seat_types),
            },
        }
    }

    pub fn source(&self) -> &RangeSource {
        &self.source
    }

    pub fn is_query_based(&self) -> bool {
        matches!(self.source, RangeSource::Query { .. })
    }

    /// 向显式范围加入商品，重复加入会被忽略
    pub fn add_product(&mut self, product: Product) -> Result<()> {
        match &mut self.source {
            RangeSource::Explicit(products) => {
                if !products.contains(&product) {
                    products.push(product);
                }
                Ok(())
            }
            _ => Err(OfferError::Validation(format!(
                "范围 {} 不是显式商品范围，不能直接加入商品",
                self.id
            ))),
        }
    }
}

/// 管理端的扁平范围配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeDefinition {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub catalog: Option<Catalog>,
    #[serde(default)]
    pub catalog_query: Option<String>,
    #[serde(default)]
    pub course_seat_types: Option<String>,
}

impl TryFrom<RangeDefinition> for Range {
    type Error = OfferError;

    fn try_from(def: RangeDefinition) -> Result<Self> {
        let query = def
            .catalog_query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        let seat_types = def
            .course_seat_types
            .as_deref()
            .map(SeatTypeFilter::parse)
            .unwrap_or_default();

        let configured = usize::from(!def.products.is_empty())
            + usize::from(def.catalog.is_some())
            + usize::from(query.is_some());
        if configured > 1 {
            return Err(OfferError::Validation(format!(
                "范围 {} 同时配置了多种成员来源（商品列表/目录/目录查询），只能选择一种",
                def.id
            )));
        }
        if !seat_types.is_empty() && query.is_none() {
            return Err(OfferError::Validation(format!(
                "范围 {} 配置了席位类型但没有目录查询",
                def.id
            )));
        }

        let range = match (def.catalog, query) {
            (Some(catalog), _) => Range::with_catalog(def.id, def.name, catalog),
            (None, Some(query)) => Range {
                id: def.id,
                name: def.name,
                source: RangeSource::Query { query, seat_types },
            },
            (None, None) => Range::explicit(def.id, def.name, def.products),
        };
        Ok(range)
    }
}

impl From<Range> for RangeDefinition {
    fn from(range: Range) -> Self {
        let mut def = RangeDefinition {
            id: range.id,
            name: range.name,
            ..Default::default()
        };
        match range.source {
            RangeSource::Explicit(products) => def.products = products,
            RangeSource::Static(catalog) => def.catalog = Some(catalog),
            RangeSource::Query { query, seat_types } => {
                def.catalog_query = Some(query);
                if !seat_types.is_empty() {
                    def.course_seat_types = Some(seat_types.to_config_string());
                }
            }
        }
        def
    }
}
