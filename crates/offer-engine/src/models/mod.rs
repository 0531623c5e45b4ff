//! 领域模型

pub mod basket;
pub mod offer;
pub mod product;
pub mod range;

pub use basket::{Basket, BasketLine, BasketOwner};
pub use offer::{Benefit, BenefitKind, Condition, ConditionalOffer};
pub use product::{Catalog, Product, ProductId, SEAT_PRODUCT_CLASS, Seat, StockRecord};
pub use range::{Range, RangeDefinition, RangeSource, SeatTypeFilter};
