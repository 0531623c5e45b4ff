//! 优惠资格评估集成测试
//!
//! 使用内存版目录服务和内存缓存，验证范围成员判定、缓存行为和条件评估的完整流程。

use offer_engine::testing::{InMemoryCatalog, test_context};
use offer_engine::{
    Basket, Benefit, Catalog, CatalogQueryLookup, Condition, ConditionalOffer, CourseRun,
    OfferCondition, OfferError, Product, Range, RangeDefinition, RangeMembership, StockRecord,
    catalog_query_cache_key,
};
use offer_shared::InMemoryCache;
use offer_shared::cache::get_json;
use std::sync::Arc;
use std::time::Duration;

const QUERY: &str = "key:*";
const COURSE: &str = "course-v1:edX+DemoX+Demo_Course";

// ==================== 辅助函数 ====================

fn verified_seat() -> Product {
    Product::seat(
        100,
        "Seat in Demo Course with verified certificate",
        COURSE,
        "verified",
    )
}

fn demo_catalog() -> Arc<InMemoryCatalog> {
    Arc::new(InMemoryCatalog::new().with_query(
        QUERY,
        vec![CourseRun {
            course_id: COURSE.to_string(),
            seat_products: vec![
                verified_seat(),
                Product::seat(101, "Seat in Demo Course", COURSE, "audit"),
            ],
        }],
    ))
}

fn setup(catalog: Arc<InMemoryCatalog>) -> (RangeMembership, Arc<InMemoryCache>) {
    let cache = Arc::new(InMemoryCache::new());
    let lookup = CatalogQueryLookup::new(catalog, cache.clone(), Duration::from_secs(3600));
    (RangeMembership::new(lookup), cache)
}

// ==================== 范围成员 ====================

#[tokio::test]
async fn test_range_contains_product() {
    let (membership, _) = setup(demo_catalog());
    let product = Product::new(1, "Book", "Book");

    let range = Range::explicit(1, "Explicit", vec![product.clone()]);
    let catalog = Catalog::new(1, "edX")
        .with_stock_records([StockRecord::new(product.clone(), "SKU-BOOK", 2)]);
    let range_with_catalog = Range::with_catalog(2, "Catalog", catalog);

    assert!(membership.contains(&range, &product, None).await.unwrap());
    assert!(
        membership
            .contains(&range_with_catalog, &product, None)
            .await
            .unwrap()
    );

    let not_in_range = Product::new(2, "Pen", "Pen");
    assert!(!membership.contains(&range, &not_in_range, None).await.unwrap());
    assert!(
        !membership
            .contains(&range_with_catalog, &not_in_range, None)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_num_products_matches_all_products() {
    let catalog = demo_catalog();
    let (membership, _) = setup(catalog.clone());
    let ctx = test_context();
    let product = Product::new(1, "Book", "Book");

    let ranges = vec![
        Range::empty(1, "Empty"),
        Range::explicit(2, "Explicit", vec![product.clone()]),
        Range::with_catalog(
            3,
            "Catalog",
            Catalog::new(1, "edX").with_stock_records([StockRecord::new(product, "SKU", 2)]),
        ),
        Range::with_query(4, "Verified", QUERY, "verified"),
        Range::with_query(5, "All seats", QUERY, ""),
    ];

    let mut sizes = Vec::new();
    for range in &ranges {
        let all = membership.all_products(range, Some(&ctx)).await.unwrap();
        let num = membership.num_products(range, Some(&ctx)).await.unwrap();
        assert_eq!(num, all.len(), "range {} size mismatch", range.id);
        sizes.push(num);
    }
    assert_eq!(sizes, vec![0, 1, 1, 1, 2]);

    let verified = membership
        .all_products(&ranges[3], Some(&ctx))
        .await
        .unwrap();
    assert!(verified.contains(&verified_seat()));
}

#[tokio::test]
async fn test_query_range_contains_seat() {
    let catalog = demo_catalog();
    let (membership, _) = setup(catalog.clone());
    let ctx = test_context();
    let seat = verified_seat();

    // 没有配置查询的范围不包含席位
    let plain = Range::empty(1, "Plain");
    assert!(!membership.contains(&plain, &seat, Some(&ctx)).await.unwrap());
    assert_eq!(catalog.query_calls(), 0);

    let range = Range::with_query(2, "Verified", QUERY, "verified");
    assert!(membership.contains(&range, &seat, Some(&ctx)).await.unwrap());
    assert_eq!(catalog.query_calls(), 1);

    let unmatched = Product::seat(200, "Seat in Other", "course-v1:edX+Other+2024", "verified");
    assert!(!membership.contains(&range, &unmatched, Some(&ctx)).await.unwrap());
}

#[tokio::test]
async fn test_seat_type_filter_skips_remote_query() {
    let catalog = demo_catalog();
    let (membership, cache) = setup(catalog.clone());
    let range = Range::with_query(1, "Verified", QUERY, "verified");
    let audit = Product::seat(101, "Seat in Demo Course", COURSE, "audit");

    assert!(
        !membership
            .contains(&range, &audit, Some(&test_context()))
            .await
            .unwrap()
    );
    assert_eq!(catalog.query_calls(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_query_without_context_fails() {
    let (membership, _) = setup(demo_catalog());
    let range = Range::with_query(1, "Verified", QUERY, "verified");

    let err = membership
        .contains(&range, &verified_seat(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, OfferError::Configuration(_)));
    assert!(!err.is_retryable());
}

// ==================== 缓存 ====================

#[tokio::test]
async fn test_query_contains_cache_round_trip() {
    let catalog = demo_catalog();
    let (membership, cache) = setup(catalog.clone());
    let lookup = membership.lookup();
    let ctx = test_context();
    let key = catalog_query_cache_key(QUERY, COURSE);

    let before: Option<offer_engine::CatalogQueryResponse> =
        get_json(cache.as_ref(), &key).await.unwrap();
    assert!(before.is_none());

    let first = lookup.query_contains(&ctx, QUERY, COURSE).await.unwrap();
    assert!(first.course_runs[COURSE]);
    assert_eq!(catalog.query_calls(), 1);

    let cached = get_json(cache.as_ref(), &key).await.unwrap();
    assert_eq!(cached, Some(first.clone()));

    let second = lookup.query_contains(&ctx, QUERY, COURSE).await.unwrap();
    assert_eq!(catalog.query_calls(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_remote_failure_not_cached() {
    let catalog = demo_catalog();
    catalog.set_failing(true);
    let (membership, cache) = setup(catalog.clone());
    let ctx = test_context();

    let err = membership
        .lookup()
        .query_contains(&ctx, QUERY, COURSE)
        .await
        .unwrap_err();
    assert!(matches!(err, OfferError::ServiceUnavailable { .. }));
    assert!(cache.is_empty());

    // 恢复后重新请求
    catalog.set_failing(false);
    assert!(
        membership
            .lookup()
            .query_contains(&ctx, QUERY, COURSE)
            .await
            .unwrap()
            .contains(COURSE)
    );
    assert_eq!(catalog.query_calls(), 2);
}

#[tokio::test]
async fn test_concurrent_misses_populate_cache() {
    let catalog = demo_catalog();
    catalog.set_delay(Duration::from_millis(20));
    let (membership, cache) = setup(catalog.clone());
    let ctx = test_context();

    let lookup_a = membership.lookup().clone();
    let lookup_b = membership.lookup().clone();
    let ctx_a = ctx.clone();
    let ctx_b = ctx.clone();

    let (a, b) = tokio::join!(
        tokio::spawn(async move { lookup_a.query_contains(&ctx_a, QUERY, COURSE).await }),
        tokio::spawn(async move { lookup_b.query_contains(&ctx_b, QUERY, COURSE).await }),
    );
    let a = a.unwrap().unwrap();
    let b = b.unwrap().unwrap();
    assert_eq!(a, b);

    // 两个请求可能都未命中，但至多各请求一次
    let calls = catalog.query_calls();
    assert!((1..=2).contains(&calls));

    let cached: Option<offer_engine::CatalogQueryResponse> =
        get_json(cache.as_ref(), &catalog_query_cache_key(QUERY, COURSE))
            .await
            .unwrap();
    assert_eq!(cached, Some(a));
}

// ==================== 条件优惠 ====================

#[tokio::test]
async fn test_conditional_offer_with_query_range() {
    let catalog = demo_catalog();
    let (membership, _) = setup(catalog.clone());
    let evaluator = OfferCondition::new(membership);
    let ctx = test_context();

    let offer = ConditionalOffer::new(
        1,
        "Verified seat discount",
        Condition::new(Range::with_query(1, "Verified", QUERY, "verified"), 1),
        Benefit::percentage(25.0),
    )
    .with_email_domains("example.com");

    let mut basket = Basket::for_owner(1, 42, "learner@example.com");
    basket.add_product(verified_seat(), 1);
    basket.add_product(Product::new(1, "Book", "Book"), 3);

    assert!(
        evaluator
            .is_condition_satisfied(&offer, &basket, Some(&ctx))
            .await
            .unwrap()
    );
    assert_eq!(
        evaluator
            .matching_quantity(&offer.condition, &basket, Some(&ctx))
            .await
            .unwrap(),
        1
    );

    let mut stranger = Basket::for_owner(2, 43, "learner@other.com");
    stranger.add_product(verified_seat(), 1);
    assert!(
        !evaluator
            .is_condition_satisfied(&offer, &stranger, Some(&ctx))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_offer_evaluation_propagates_outage() {
    let catalog = demo_catalog();
    catalog.set_failing(true);
    let (membership, _) = setup(catalog);
    let evaluator = OfferCondition::new(membership);

    let offer = ConditionalOffer::new(
        1,
        "Verified seat discount",
        Condition::new(Range::with_query(1, "Verified", QUERY, "verified"), 1),
        Benefit::percentage(25.0),
    );
    let mut basket = Basket::for_owner(1, 42, "learner@example.com");
    basket.add_product(verified_seat(), 1);

    let err = evaluator
        .is_condition_satisfied(&offer, &basket, Some(&test_context()))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SERVICE_UNAVAILABLE");
}

// ==================== 范围配置 ====================

#[test]
fn test_range_definition_validation() {
    let product = Product::new(1, "Book", "Book");

    let dual = RangeDefinition {
        id: 1,
        name: "Dual".to_string(),
        products: vec![product.clone()],
        catalog: Some(Catalog::new(1, "edX")),
        ..Default::default()
    };
    assert!(matches!(
        Range::try_from(dual),
        Err(OfferError::Validation(_))
    ));

    let query = RangeDefinition {
        id: 2,
        name: "Query".to_string(),
        catalog_query: Some(QUERY.to_string()),
        course_seat_types: Some("verified".to_string()),
        ..Default::default()
    };
    assert!(Range::try_from(query).unwrap().is_query_based());
}
