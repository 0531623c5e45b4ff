//! 优惠资格评估引擎
//!
//! 判断商品是否属于优惠范围、篮子是否满足条件优惠，支持：
//! - 显式商品列表、静态目录、动态目录查询三种范围来源
//! - 目录查询结果的 cache-aside 缓存
//! - 席位类型过滤与邮箱域名限制

pub mod catalog;
pub mod condition;
pub mod context;
pub mod error;
pub mod membership;
pub mod models;
pub mod testing;

pub use catalog::{
    CatalogQueryClient, CatalogQueryLookup, CatalogQueryResponse, CourseRun, HttpCatalogClient,
    catalog_query_cache_key,
};
pub use condition::OfferCondition;
pub use context::{RequestContext, Site};
pub use error::{OfferError, Result};
pub use membership::RangeMembership;
pub use models::{
    Basket, BasketLine, BasketOwner, Benefit, BenefitKind, Catalog, Condition, ConditionalOffer,
    Product, ProductId, Range, RangeDefinition, RangeSource, SEAT_PRODUCT_CLASS, Seat, SeatTypeFilter,
    StockRecord,
};
