//! HTTP API integration tests
//!
//! Drives the REST routes and the live channel through actix's test
//! service with a temporary SQLite database per test.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::{Value, json};
use tempfile::TempDir;

use scanlinker::api::response::json_config;
use scanlinker::api::services::{AppStartTime, api_routes, live_routes};
use scanlinker::services::{LiveHub, ScanService, UpdateBroadcaster};
use scanlinker::storage::backend::SeaOrmStorage;

// =============================================================================
// Test Setup
// =============================================================================

struct TestEnv {
    _temp_dir: TempDir,
    service: Arc<ScanService>,
    hub: Arc<LiveHub>,
}

async fn init_test_env() -> TestEnv {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("api_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    let hub = Arc::new(LiveHub::new(16));
    let service = Arc::new(ScanService::new(storage, hub.clone()));

    TestEnv {
        _temp_dir: temp_dir,
        service,
        hub,
    }
}

/// Create a test app with the same routing as the server
macro_rules! scan_app {
    ($env:expr) => {{
        test::init_service(
            App::new()
                .app_data(web::Data::new($env.service.clone()))
                .app_data(web::Data::new($env.hub.clone()))
                .app_data(web::Data::new(AppStartTime::now()))
                .app_data(json_config())
                .service(live_routes())
                .service(web::scope("").configure(api_routes)),
        )
        .await
    }};
}

fn peer(addr: &str) -> SocketAddr {
    addr.parse().unwrap()
}

/// Register a URL through the API and return its code id
macro_rules! create_code {
    ($app:expr, $url:expr) => {{
        let req = TestRequest::post()
            .uri("/create")
            .set_json(json!({ "url": $url }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        body["codeId"].as_str().unwrap().to_string()
    }};
}

// =============================================================================
// POST /create
// =============================================================================

#[actix_rt::test]
async fn test_create_returns_201_then_200() {
    let env = init_test_env().await;
    let app = scan_app!(env);

    let req = TestRequest::post()
        .uri("/create")
        .set_json(json!({ "url": "https://example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let code_id = body["codeId"].as_str().unwrap().to_string();
    assert!(body.get("scanCount").is_none());

    let req = TestRequest::post()
        .uri("/create")
        .set_json(json!({ "url": "https://example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["codeId"], code_id);
    assert_eq!(body["scanCount"], 0);
}

#[actix_rt::test]
async fn test_create_rejects_missing_url() {
    let env = init_test_env().await;
    let app = scan_app!(env);

    let req = TestRequest::post()
        .uri("/create")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].is_string());
}

#[actix_rt::test]
async fn test_create_rejects_invalid_url() {
    let env = init_test_env().await;
    let app = scan_app!(env);

    for url in ["not a url", "javascript:alert(1)", "ftp://example.com"] {
        let req = TestRequest::post()
            .uri("/create")
            .set_json(json!({ "url": url }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "url: {}", url);
    }
}

#[actix_rt::test]
async fn test_create_rejects_control_characters() {
    let env = init_test_env().await;
    let app = scan_app!(env);

    for url in ["https://example.com/a\nb", "https://example.com/a\r\nX-Evil: 1"] {
        let req = TestRequest::post()
            .uri("/create")
            .set_json(json!({ "url": url }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "url: {:?}", url);
    }

    assert!(env.service.list_all().await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_create_rejects_malformed_json() {
    let env = init_test_env().await;
    let app = scan_app!(env);

    let req = TestRequest::post()
        .uri("/create")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"url\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].is_string());
}

// =============================================================================
// GET /scan/{codeId}
// =============================================================================

#[actix_rt::test]
async fn test_scan_redirects_and_counts() {
    let env = init_test_env().await;
    let app = scan_app!(env);
    let code_id = create_code!(app, "https://example.com/landing");

    let req = TestRequest::get()
        .uri(&format!("/scan/{}", code_id))
        .peer_addr(peer("10.1.1.1:40000"))
        .insert_header((header::USER_AGENT, "Mozilla/5.0 (iPhone) Mobile Safari"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://example.com/landing"
    );
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );

    let req = TestRequest::get()
        .uri(&format!("/count/{}", code_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "scanCount": 1 }));
}

#[actix_rt::test]
async fn test_scan_unknown_code_returns_404() {
    let env = init_test_env().await;
    let app = scan_app!(env);

    let req = TestRequest::get()
        .uri("/scan/doesnotexist")
        .peer_addr(peer("10.1.1.1:40000"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("doesnotexist"));
}

#[actix_rt::test]
async fn test_scan_publishes_live_update() {
    let env = init_test_env().await;
    let app = scan_app!(env);
    let code_id = create_code!(app, "https://example.com/live");
    let mut subscription = env.hub.subscribe();

    let req = TestRequest::get()
        .uri(&format!("/scan/{}", code_id))
        .peer_addr(peer("10.1.1.2:40000"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let update = subscription.recv().await.unwrap();
    assert_eq!(update.code_id, code_id);
    assert_eq!(update.scan_count, 1);
}

// =============================================================================
// GET /users/{codeId}, /all-counts, /count/{codeId}
// =============================================================================

#[actix_rt::test]
async fn test_users_groups_scans_by_visitor() {
    let env = init_test_env().await;
    let app = scan_app!(env);
    let code_id = create_code!(app, "https://example.com/users");

    let scans = [
        ("10.2.0.1:1000", "Mozilla/5.0 (Linux; Android 14) Mobile"),
        ("10.2.0.1:1001", "Mozilla/5.0 (X11; Linux x86_64)"),
        ("10.2.0.2:1000", "Mozilla/5.0 (X11; Linux x86_64)"),
    ];
    for (addr, ua) in scans {
        let req = TestRequest::get()
            .uri(&format!("/scan/{}", code_id))
            .peer_addr(peer(addr))
            .insert_header((header::USER_AGENT, ua))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    let req = TestRequest::get()
        .uri(&format!("/users/{}", code_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let visitors = body.as_array().unwrap();
    assert_eq!(visitors.len(), 2);

    assert_eq!(visitors[0]["signature"], "10.2.0.1");
    assert_eq!(visitors[0]["count"], 2);
    assert_eq!(visitors[0]["device"], "Mobile");
    assert!(visitors[0]["firstSeen"].is_string());
    assert!(visitors[0]["lastSeen"].is_string());

    assert_eq!(visitors[1]["signature"], "10.2.0.2");
    assert_eq!(visitors[1]["count"], 1);
    assert_eq!(visitors[1]["device"], "Desktop");
}

#[actix_rt::test]
async fn test_users_device_for_missing_or_unreadable_user_agent() {
    let env = init_test_env().await;
    let app = scan_app!(env);
    let code_id = create_code!(app, "https://example.com/agents");

    // 无 User-Agent
    let req = TestRequest::get()
        .uri(&format!("/scan/{}", code_id))
        .peer_addr(peer("10.4.0.1:1000"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    // 非 ASCII 的 User-Agent
    let req = TestRequest::get()
        .uri(&format!("/scan/{}", code_id))
        .peer_addr(peer("10.4.0.2:1000"))
        .insert_header((
            header::USER_AGENT,
            header::HeaderValue::from_bytes(b"Mozilla/5.0 \xe6\x89\x8b\xe6\x9c\xba Mobile").unwrap(),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    // 存在但不匹配任何规则（空串）
    let req = TestRequest::get()
        .uri(&format!("/scan/{}", code_id))
        .peer_addr(peer("10.4.0.3:1000"))
        .insert_header((header::USER_AGENT, ""))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let req = TestRequest::get()
        .uri(&format!("/users/{}", code_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let devices: Vec<(&str, &str)> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| (v["signature"].as_str().unwrap(), v["device"].as_str().unwrap()))
        .collect();
    assert_eq!(
        devices,
        vec![
            ("10.4.0.1", "Unknown"),
            ("10.4.0.2", "Unknown"),
            ("10.4.0.3", "Desktop"),
        ]
    );
}

#[actix_rt::test]
async fn test_users_and_count_unknown_code_return_404() {
    let env = init_test_env().await;
    let app = scan_app!(env);

    for uri in ["/users/missing", "/count/missing"] {
        let req = TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "uri: {}", uri);
    }
}

#[actix_rt::test]
async fn test_all_counts_lists_codes() {
    let env = init_test_env().await;
    let app = scan_app!(env);

    let req = TestRequest::get().uri("/all-counts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([]));

    let code_id = create_code!(app, "https://example.com/all");
    let req = TestRequest::get()
        .uri(&format!("/scan/{}", code_id))
        .peer_addr(peer("10.3.0.1:1000"))
        .to_request();
    test::call_service(&app, req).await;

    let req = TestRequest::get().uri("/all-counts").to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!([{ "codeId": code_id, "url": "https://example.com/all", "count": 1 }])
    );
}

// =============================================================================
// Health and live channel
// =============================================================================

#[actix_rt::test]
async fn test_health_reports_storage() {
    let env = init_test_env().await;
    let app = scan_app!(env);

    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"]["backend"], "sqlite");
    assert_eq!(body["storage"]["codesCount"], 0);
}

#[actix_rt::test]
async fn test_events_opens_sse_stream() {
    let env = init_test_env().await;
    let app = scan_app!(env);

    let req = TestRequest::get().uri("/events").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    assert_eq!(env.hub.subscriber_count(), 1);

    drop(resp);
    assert_eq!(env.hub.subscriber_count(), 0);
}
