//! HTTP API tests
//!
//! Exercises the share API, the public note page and the health endpoint
//! through the actix test harness with an in-memory store.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use notelink::api::middleware::RequestIdMiddleware;
use notelink::api::services::{AppStartTime, PageContext, health_routes, page_routes, share_routes};
use notelink::errors::NotelinkError;
use notelink::services::{ShareService, ShareSettings};
use notelink::storage::{KvStore, MemoryStore};

// =============================================================================
// Test Setup
// =============================================================================

macro_rules! test_app {
    ($store:expr) => {
        test_app!($store, ShareSettings::default())
    };
    ($store:expr, $settings:expr) => {{
        let store: Arc<dyn KvStore> = $store;
        let service = Arc::new(ShareService::new(store.clone(), $settings));
        let settings = service.settings().clone();
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new(store))
                .app_data(web::Data::new(service))
                .app_data(web::Data::new(PageContext::new(
                    "Notelink",
                    &settings.base_url,
                )))
                .app_data(web::Data::new(AppStartTime::now()))
                .service(share_routes(settings.max_content_bytes))
                .service(page_routes())
                .service(health_routes()),
        )
        .await
    }};
}

fn memory_store() -> Arc<dyn KvStore> {
    Arc::new(MemoryStore::new())
}

/// Store whose every operation fails
struct FailingStore;

#[async_trait]
impl KvStore for FailingStore {
    async fn get(&self, _key: &str) -> notelink::errors::Result<Option<String>> {
        Err(NotelinkError::store_connection("redis unavailable"))
    }

    async fn set(
        &self,
        _key: &str,
        _value: String,
        _ttl: Option<Duration>,
    ) -> notelink::errors::Result<()> {
        Err(NotelinkError::store_connection("redis unavailable"))
    }

    async fn set_nx(
        &self,
        _key: &str,
        _value: String,
        _ttl: Option<Duration>,
    ) -> notelink::errors::Result<bool> {
        Err(NotelinkError::store_connection("redis unavailable"))
    }

    async fn increment(&self, _key: &str, _window: Duration) -> notelink::errors::Result<u64> {
        Err(NotelinkError::store_connection("redis unavailable"))
    }

    async fn ping(&self) -> notelink::errors::Result<()> {
        Err(NotelinkError::store_connection("redis unavailable"))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

fn parse_ts(value: &Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().expect("timestamp string"))
        .expect("valid RFC 3339")
        .with_timezone(&Utc)
}

// =============================================================================
// POST /api/share
// =============================================================================

#[actix_web::test]
async fn test_share_success() {
    let app = test_app!(memory_store());

    let req = TestRequest::post()
        .uri("/api/share")
        .set_json(json!({ "content": "hello world", "expiresIn": "1d" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], true);
    let slug = body["slug"].as_str().unwrap();
    assert_eq!(slug.len(), 8);
    assert_eq!(body["url"], format!("http://127.0.0.1:8080/s/{}", slug));
    assert!(body["expiresAt"].as_str().unwrap().ends_with('Z'));
}

#[actix_web::test]
async fn test_share_defaults_to_seven_days() {
    let app = test_app!(memory_store());

    let req = TestRequest::post()
        .uri("/api/share")
        .set_json(json!({ "content": "default expiry" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let slug = body["slug"].as_str().unwrap().to_string();

    let req = TestRequest::get()
        .uri(&format!("/api/share/{}", slug))
        .to_request();
    let note: Value = test::call_and_read_body_json(&app, req).await;

    let created = parse_ts(&note["createdAt"]);
    let expires = parse_ts(&note["expiresAt"]);
    assert_eq!(expires - created, chrono::Duration::days(7));
    assert_eq!(note["expiresAt"], body["expiresAt"]);
}

#[actix_web::test]
async fn test_share_never_expires() {
    let app = test_app!(memory_store());

    let req = TestRequest::post()
        .uri("/api/share")
        .set_json(json!({ "content": "keep", "expiresIn": "never" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["ok"], true);
    assert!(body["expiresAt"].is_null());
}

#[actix_web::test]
async fn test_share_ignores_content_type() {
    let app = test_app!(memory_store());

    for content_type in [None, Some("text/plain")] {
        let mut req = TestRequest::post()
            .uri("/api/share")
            .set_payload(r#"{"content":"typed loosely"}"#);
        if let Some(ct) = content_type {
            req = req.insert_header(("Content-Type", ct));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "content type {:?}", content_type);
    }
}

#[actix_web::test]
async fn test_share_malformed_body() {
    let app = test_app!(memory_store());

    for payload in [
        "{not json",
        r#"{"content":"x","expiresIn":"2d"}"#,
        r#"{"content":42}"#,
        "null",
    ] {
        let req = TestRequest::post()
            .uri("/api/share")
            .insert_header(("Content-Type", "application/json"))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {}", payload);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "SERVER_ERROR");
        assert_eq!(body["error"], "Invalid JSON body");
    }
}

#[actix_web::test]
async fn test_share_empty_content() {
    let app = test_app!(memory_store());

    for payload in [json!({ "content": "   " }), json!({}), json!({ "content": null })] {
        let req = TestRequest::post()
            .uri("/api/share")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "EMPTY_CONTENT");
        assert_eq!(body["error"], "Content cannot be empty");
    }
}

#[actix_web::test]
async fn test_share_content_too_large() {
    let app = test_app!(memory_store());

    let req = TestRequest::post()
        .uri("/api/share")
        .set_json(json!({ "content": "a".repeat(51_201) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["code"], "CONTENT_TOO_LARGE");
    assert_eq!(body["error"], "Content exceeds maximum size of 50KB");
}

#[actix_web::test]
async fn test_share_body_over_transport_limit() {
    let app = test_app!(memory_store());

    let payload = format!(r#"{{"content":"{}"}}"#, "b".repeat(400_000));
    let req = TestRequest::post()
        .uri("/api/share")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "CONTENT_TOO_LARGE");
}

#[actix_web::test]
async fn test_share_escaped_content_at_limit_fits_transport() {
    let app = test_app!(memory_store());

    // 每个双引号在 JSON 中占两个字节
    let req = TestRequest::post()
        .uri("/api/share")
        .set_json(json!({ "content": "\"".repeat(51_200) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_share_rate_limited_per_forwarded_address() {
    let settings = ShareSettings {
        rate_limit_max: 2,
        ..ShareSettings::default()
    };
    let app = test_app!(memory_store(), settings);

    let share = |ip: &'static str| {
        TestRequest::post()
            .uri("/api/share")
            .insert_header(("X-Forwarded-For", ip))
            .set_json(json!({ "content": "burst" }))
            .to_request()
    };

    assert_eq!(test::call_service(&app, share("203.0.113.1")).await.status(), StatusCode::OK);
    assert_eq!(test::call_service(&app, share("203.0.113.1")).await.status(), StatusCode::OK);

    let resp = test::call_service(&app, share("203.0.113.1")).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "RATE_LIMITED");
    assert_eq!(body["error"], "Rate limit exceeded. Please try again later.");

    assert_eq!(
        test::call_service(&app, share("203.0.113.2, 10.0.0.1")).await.status(),
        StatusCode::OK
    );
}

#[actix_web::test]
async fn test_share_store_failure() {
    let app = test_app!(Arc::new(FailingStore));

    let req = TestRequest::post()
        .uri("/api/share")
        .set_json(json!({ "content": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "SERVER_ERROR");
    assert_eq!(body["error"], "Internal server error");
}

// =============================================================================
// GET /api/share/{slug}
// =============================================================================

#[actix_web::test]
async fn test_get_share_metadata() {
    let app = test_app!(memory_store());

    let req = TestRequest::post()
        .uri("/api/share")
        .set_json(json!({ "content": "<b>bold</b>", "expiresIn": "30d" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;

    let req = TestRequest::get()
        .uri(&format!("/api/share/{}", created["slug"].as_str().unwrap()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let note: Value = test::read_body_json(resp).await;
    assert_eq!(note["content"], "<b>bold</b>");
    assert!(note["createdAt"].is_string());
    assert_eq!(note["expiresAt"], created["expiresAt"]);
}

#[actix_web::test]
async fn test_get_share_not_found() {
    let app = test_app!(memory_store());

    for uri in ["/api/share/missing1", "/api/share/bad.slug"] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Note not found or has expired" }));
    }
}

#[actix_web::test]
async fn test_get_share_empty_slug() {
    let app = test_app!(memory_store());

    let resp = test::call_service(&app, TestRequest::get().uri("/api/share/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Slug is required" }));
}

#[actix_web::test]
async fn test_get_share_store_failure() {
    let app = test_app!(Arc::new(FailingStore));

    let resp =
        test::call_service(&app, TestRequest::get().uri("/api/share/abcdEFGH").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

// =============================================================================
// GET /s/{slug}
// =============================================================================

#[actix_web::test]
async fn test_public_page_escapes_content() {
    let app = test_app!(memory_store());

    let req = TestRequest::post()
        .uri("/api/share")
        .set_json(json!({ "content": "<script>alert('x')</script>", "expiresIn": "never" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let slug = created["slug"].as_str().unwrap();

    let resp = test::call_service(
        &app,
        TestRequest::get().uri(&format!("/s/{}", slug)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(resp.headers().contains_key("content-security-policy"));
    assert_eq!(resp.headers().get("x-content-type-options").unwrap(), "nosniff");

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;"));
    assert!(html.contains("Never expires"));
    assert!(html.contains(&format!("http://127.0.0.1:8080/?openShared={}", slug)));
    assert!(html.contains(r#"<meta property="og:description""#));
}

#[actix_web::test]
async fn test_public_page_not_found() {
    let app = test_app!(memory_store());

    for uri in ["/s/missing1", "/s/", "/s/%3Cscript%3E"] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "uri {}", uri);

        let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(html.contains("Note Not Found"));
    }
}

#[actix_web::test]
async fn test_public_page_hides_store_failure() {
    let app = test_app!(Arc::new(FailingStore));

    let resp = test::call_service(&app, TestRequest::get().uri("/s/abcdEFGH").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Health & middleware
// =============================================================================

#[actix_web::test]
async fn test_health_ok() {
    let app = test_app!(memory_store());

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
    assert!(body["uptime_secs"].is_u64());
    assert!(body.get("error").is_none());
}

#[actix_web::test]
async fn test_health_unhealthy_store() {
    let app = test_app!(Arc::new(FailingStore));

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["store"], "failing");
    assert!(body["error"].as_str().unwrap().contains("redis unavailable"));
}

#[actix_web::test]
async fn test_request_id_propagated_from_upstream() {
    let app = test_app!(memory_store());

    let req = TestRequest::get()
        .uri("/health")
        .insert_header(("X-Request-ID", "edge-1234"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "edge-1234");

    let resp = test::call_service(&app, TestRequest::get().uri("/s/nothing").to_request()).await;
    let generated = resp.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(generated.len(), 36);
}
