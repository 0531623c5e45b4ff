//! HTTP 目录客户端测试
//!
//! 在本地端口启动 axum 实现的目录服务替身，验证请求参数、鉴权头、分页和错误映射。

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use offer_engine::{CatalogQueryClient, HttpCatalogClient, OfferError, RequestContext, Site};
use offer_shared::config::CatalogConfig;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

const TOKEN: &str = "catalog-token";
const COURSE: &str = "course-v1:edX+DemoX+Demo_Course";

#[derive(Debug, Deserialize)]
struct ContainsParams {
    query: String,
    course_run_ids: String,
}

#[derive(Clone)]
struct CatalogState {
    base_url: String,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

async fn contains(
    headers: HeaderMap,
    Query(params): Query<ContainsParams>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let course_runs: HashMap<String, bool> = params
        .course_run_ids
        .split(',')
        .map(|id| (id.to_string(), params.query == "key:*" && id == COURSE))
        .collect();
    Ok(Json(json!({ "course_runs": course_runs })))
}

async fn course_runs(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let page = params.get("page").map(String::as_str).unwrap_or("1");
    let body = match page {
        "1" => json!({
            "next": format!("{}/course_runs/?q=key%3A*&page=2", state.base_url),
            "results": [{
                "key": COURSE,
                "title": "Demo Course",
                "seats": [
                    {"product_id": 1, "type": "verified"},
                    {"product_id": 2, "type": "audit"}
                ]
            }]
        }),
        _ => json!({
            "next": null,
            "results": [{
                "key": "course-v1:edX+Other+2024",
                "seats": [{"product_id": 3, "type": "verified", "title": "Seat in Other"}]
            }]
        }),
    };
    Ok(Json(body))
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({ "course_runs": {} }))
}

/// 启动目录服务替身，返回 API 根地址
async fn spawn_catalog() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base_url = format!("http://{}/api/v1", addr);

    let app = Router::new()
        .route("/api/v1/course_runs/contains/", get(contains))
        .route("/api/v1/course_runs/", get(course_runs))
        .route("/broken/course_runs/contains/", get(broken))
        .route("/slow/course_runs/contains/", get(slow))
        .with_state(CatalogState {
            base_url: base_url.clone(),
        });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base_url
}

fn ctx(catalog_api_url: &str, token: &str) -> RequestContext {
    RequestContext::new(
        Site::new("shop.example.com").with_catalog_api_url(catalog_api_url),
        token,
    )
}

#[tokio::test]
async fn test_query_contains_over_http() {
    let base_url = spawn_catalog().await;
    let client = HttpCatalogClient::new(CatalogConfig::default()).unwrap();

    let response = client
        .query(
            &ctx(&base_url, TOKEN),
            "key:*",
            &[COURSE.to_string(), "course-v1:edX+Missing+2020".to_string()],
        )
        .await
        .unwrap();

    assert!(response.contains(COURSE));
    assert!(!response.contains("course-v1:edX+Missing+2020"));
    assert_eq!(response.course_runs.len(), 2);
}

#[tokio::test]
async fn test_course_runs_follows_pagination() {
    let base_url = spawn_catalog().await;
    let client = HttpCatalogClient::new(CatalogConfig::default()).unwrap();

    let runs = client
        .course_runs(&ctx(&base_url, TOKEN), "key:*")
        .await
        .unwrap();

    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].course_id, COURSE);
    assert_eq!(runs[0].seat_products.len(), 2);
    assert_eq!(runs[1].seat_products[0].title, "Seat in Other");
}

#[tokio::test]
async fn test_course_runs_respects_page_limit() {
    let base_url = spawn_catalog().await;
    let config = CatalogConfig {
        max_pages: 1,
        ..Default::default()
    };
    let client = HttpCatalogClient::new(config).unwrap();

    let runs = client
        .course_runs(&ctx(&base_url, TOKEN), "key:*")
        .await
        .unwrap();
    assert_eq!(runs.len(), 1);
}

#[tokio::test]
async fn test_unauthorized_is_service_unavailable() {
    let base_url = spawn_catalog().await;
    let client = HttpCatalogClient::new(CatalogConfig::default()).unwrap();

    let err = client
        .query(&ctx(&base_url, "wrong-token"), "key:*", &[COURSE.to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, OfferError::ServiceUnavailable { .. }));
}

#[tokio::test]
async fn test_server_error_is_service_unavailable() {
    let base_url = spawn_catalog().await;
    let broken_url = base_url.replace("/api/v1", "/broken");
    let client = HttpCatalogClient::new(CatalogConfig::default()).unwrap();

    let err = client
        .query(&ctx(&broken_url, TOKEN), "key:*", &[COURSE.to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_timeout_is_service_unavailable() {
    let base_url = spawn_catalog().await;
    let slow_url = base_url.replace("/api/v1", "/slow");
    let config = CatalogConfig {
        request_timeout_seconds: 1,
        ..Default::default()
    };
    let client = HttpCatalogClient::new(config).unwrap();

    let err = client
        .query(&ctx(&slow_url, TOKEN), "key:*", &[COURSE.to_string()])
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}
