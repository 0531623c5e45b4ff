//! 商品与库存模型

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

pub type ProductId = i64;

/// 课程席位商品的商品类别
pub const SEAT_PRODUCT_CLASS: &str = "Seat";

/// 课程席位属性
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub course_id: String,
    /// 证书类型，如 verified / professional / audit
    pub seat_type: String,
    #[serde(default)]
    pub id_verification_required: bool,
    #[serde(default)]
    pub credit_provider: Option<String>,
    #[serde(default)]
    pub credit_hours: Option<u32>,
}

/// 可购买的商品
///
/// 以 `id` 作为身份，比较和哈希只看 `id`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub product_class: String,
    #[serde(default)]
    pub seat: Option<Seat>,
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Product {}

impl Hash for Product {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Product {
    pub fn new(id: ProductId, title: impl Into<String>, product_class: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            product_class: product_class.into(),
            seat: None,
        }
    }

    /// 创建课程席位商品
    pub fn seat(
        id: ProductId,
        title: impl Into<String>,
        course_id: impl Into<String>,
        seat_type: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            product_class: SEAT_PRODUCT_CLASS.to_string(),
            seat: Some(Seat {
                course_id: course_id.into(),
                seat_type: seat_type.into(),
                id_verification_required: false,
                credit_provider: None,
                credit_hours: None,
            }),
        }
    }

    pub fn with_id_verification(mut self, required: bool) -> Self {
        if let Some(seat) = self.seat.as_mut() {
            seat.id_verification_required = required;
        }
        self
    }

    pub fn with_credit(mut self, provider: impl Into<String>, hours: u32) -> Self {
        if let Some(seat) = self.seat.as_mut() {
            seat.credit_provider = Some(provider.into());
            seat.credit_hours = Some(hours);
        }
        self
    }

    pub fn is_seat(&self) -> bool {
        self.product_class == SEAT_PRODUCT_CLASS && self.seat.is_some()
    }

    pub fn course_id(&self) -> Option<&str> {
        self.seat.as_ref().map(|s| s.course_id.as_str())
    }

    pub fn seat_type(&self) -> Option<&str> {
        self.seat.as_ref().map(|s| s.seat_type.as_str())
    }

    pub fn credit_provider(&self) -> Option<&str> {
        self.seat.as_ref().and_then(|s| s.credit_provider.as_deref())
    }

    /// 席位对应的报名模式
    ///
    /// 无证书类型时为 audit；professional 且不要求身份验证时为 no-id-professional。
    pub fn seat_mode(&self) -> String {
        match &self.seat {
            Some(seat) if seat.seat_type == "professional" && !seat.id_verification_required => {
                "no-id-professional".to_string()
            }
            Some(seat) if !seat.seat_type.is_empty() => seat.seat_type.clone(),
            _ => "audit".to_string(),
        }
    }
}

/// 库存记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub product: Product,
    pub partner_sku: String,
    pub num_in_stock: u32,
}

impl StockRecord {
    pub fn new(product: Product, partner_sku: impl Into<String>, num_in_stock: u32) -> Self {
        Self {
            product,
            partner_sku: partner_sku.into(),
            num_in_stock,
        }
    }
}

/// 静态目录：合作方拥有的一组库存记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub id: i64,
    pub partner: String,
    #[serde(default)]
    stock_records: Vec<StockRecord>,
}

impl Catalog {
    pub fn new(id: i64, partner: impl Into<String>) -> Self {
        Self {
            id,
            partner: partner.into(),
            stock_records: Vec::new(),
        }
    }

    pub fn with_stock_records(mut self, records: impl IntoIterator<Item = StockRecord>) -> Self {
        self.stock_records.extend(records);
        self
    }

    pub fn stock_records(&self) -> &[StockRecord] {
        &self.stock_records
    }

    pub fn contains_product(&self, product: &Product) -> bool {
        self.stock_records.iter().any(|r| r.product.id == product.id)
    }

    /// 目录中的商品，按库存记录顺序并按商品去重
    pub fn products(&self) -> Vec<Product> {
        let mut products: Vec<Product> = Vec::with_capacity(self.stock_records.len());
        for record in &self.stock_records {
            if !products.iter().any(|p| p.id == record.product.id) {
                products.push(record.product.clone());
            }
        }
        products
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_by_id() {
        let a = Product::new(1, "Book", "Book");
        let b = Product::new(1, "Renamed", "Book");
        assert_eq!(a, b);
        assert_ne!(a, Product::new(2, "Book", "Book"));
    }

    #[test]
    fn test_seat_mode() {
        let verified = Product::seat(1, "Seat", "course-v1:edX+DemoX+Demo", "verified");
        assert_eq!(verified.seat_mode(), "verified");

        let professional = Product::seat(2, "Seat", "course-v1:edX+DemoX+Demo", "professional");
        assert_eq!(professional.seat_mode(), "no-id-professional");
        assert_eq!(
            professional.with_id_verification(true).seat_mode(),
            "professional"
        );

        assert_eq!(Product::new(3, "Mug", "Merch").seat_mode(), "audit");
    }

    #[test]
    fn test_catalog_products_deduplicated() {
        let product = Product::new(1, "Book", "Book");
        let catalog = Catalog::new(1, "edX").with_stock_records([
            StockRecord::new(product.clone(), "SKU-1", 2),
            StockRecord::new(product.clone(), "SKU-1B", 5),
        ]);

        assert!(catalog.contains_product(&product));
        assert!(!catalog.contains_product(&Product::new(2, "Pen", "Pen")));
        assert_eq!(catalog.products().len(), 1);
    }
}
