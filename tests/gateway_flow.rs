//! End-to-end tests: HTTP front end → gateway → scheduler → real HTTP transport → mock upstream.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use steam_gateway::lifecycle::startup::bootstrap;
use steam_gateway::{GatewayState, HttpServer};

mod common;
use common::{get, json_body, send, start_steam, test_config, Journal, ADMIN_KEY, GOOD_KEY};

async fn ready_router(journal: &Journal) -> axum::Router {
    let addr = start_steam(journal.clone(), |_| None).await;
    let config = test_config(addr);
    let gateway = bootstrap(&config).await.expect("bootstrap failed");
    assert_eq!(gateway.state(), GatewayState::Ready);
    HttpServer::new(config, gateway).router()
}

#[tokio::test]
async fn test_startup_probes_key_and_loads_listing() {
    let journal = Journal::default();
    let router = ready_router(&journal).await;

    let probe = &journal.hits("/IDOTA2Match_570/GetMatchDetails/v1/")[0];
    assert_eq!(probe.param("match_id"), Some("-1"));
    assert_eq!(probe.param("key"), Some(GOOD_KEY));
    assert_eq!(journal.hits("/ISteamWebAPIUtil/GetSupportedAPIList/v1/").len(), 1);

    let response = get(&router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ready");
}

#[tokio::test]
async fn test_call_is_cached_across_version_spellings() {
    let journal = Journal::default();
    let router = ready_router(&journal).await;

    let first = get(&router, "/api/ISteamUser/GetPlayerSummaries/v0002?steamids=76561197960287930").await;
    assert_eq!(first.status(), StatusCode::OK);
    let first = json_body(first).await;
    assert_eq!(first["response"]["players"][0]["steamid"], "76561197960287930");

    let second = get(&router, "/api/ISteamUser/GetPlayerSummaries/2?steamids=76561197960287930").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(json_body(second).await, first);

    let hits = journal.hits("/ISteamUser/GetPlayerSummaries/v2/");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].param("key"), Some(GOOD_KEY));
}

#[tokio::test]
async fn test_nocache_bypasses_and_is_not_forwarded() {
    let journal = Journal::default();
    let router = ready_router(&journal).await;

    for _ in 0..2 {
        let response = get(&router, "/api/IEconDOTA2_570/GetHeroes/v1?language=en&nocache=1").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let hits = journal.hits("/IEconDOTA2_570/GetHeroes/v1/");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].param("nocache"), None);
    assert_eq!(hits[0].param("language"), Some("en"));
}

#[tokio::test]
async fn test_caller_supplied_key_is_replaced() {
    let journal = Journal::default();
    let router = ready_router(&journal).await;

    let response = get(&router, "/api/ISteamUser/GetPlayerSummaries/v2?steamids=1&key=STOLEN").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        journal.hits("/ISteamUser/GetPlayerSummaries/v2/")[0].param("key"),
        Some(GOOD_KEY)
    );
}

#[tokio::test]
async fn test_request_errors_use_json_shape() {
    let journal = Journal::default();
    let router = ready_router(&journal).await;
    let before = journal.total();

    let cases = [
        ("/api/ISteamUser/GetPlayerSummaries/v2", StatusCode::BAD_REQUEST, "steamids"),
        ("/api/ISteamUser/GetPlayerSummaries/vX", StatusCode::BAD_REQUEST, "vX"),
        ("/api/ISteamUser/GetPlayerSummaries/v9", StatusCode::NOT_FOUND, "does not exist"),
        ("/api/ISteamUserAuth/AuthenticateUser/v1", StatusCode::NOT_FOUND, "does not exist"),
        ("/no/such/route", StatusCode::NOT_FOUND, "Not Found"),
    ];

    for (uri, status, needle) in cases {
        let response = get(&router, uri).await;
        assert_eq!(response.status(), status, "{uri}");
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains(needle), "{uri}: {body}");
        assert!(body["error"].is_object(), "{uri}");
    }

    assert_eq!(journal.total(), before, "rejected requests must not reach upstream");
}

#[tokio::test]
async fn test_request_id_is_assigned_and_propagated() {
    let journal = Journal::default();
    let router = ready_router(&journal).await;

    let response = get(&router, "/health").await;
    assert!(response.headers().contains_key("x-request-id"));

    let request = Request::get("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_admin_requires_bearer_token() {
    let journal = Journal::default();
    let router = ready_router(&journal).await;

    let response = get(&router, "/admin/status").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::get("/admin/status")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&router, request).await.status(), StatusCode::UNAUTHORIZED);

    let authed = |uri: &str| {
        Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_KEY))
            .body(Body::empty())
            .unwrap()
    };

    let status = json_body(send(&router, authed("/admin/status")).await).await;
    assert_eq!(status["state"], "ready");
    assert_eq!(status["methods"], 5);

    get(&router, "/api/ISteamUser/GetPlayerSummaries/v2?steamids=1").await;
    get(&router, "/api/ISteamUser/GetPlayerSummaries/v2?steamids=1").await;
    let cache = json_body(send(&router, authed("/admin/cache")).await).await;
    assert_eq!(cache["enabled"], true);
    assert_eq!(cache["hits"], 1);
    // The method listing and one player summary.
    assert_eq!(cache["entries"], 2);

    let scheduler = json_body(send(&router, authed("/admin/scheduler")).await).await;
    assert_eq!(scheduler["busy"], false);
    assert_eq!(scheduler["dispatch_interval_ms"], 20);
}

#[tokio::test]
async fn test_admin_routes_absent_when_disabled() {
    let journal = Journal::default();
    let addr = start_steam(journal.clone(), |_| None).await;
    let mut config = test_config(addr);
    config.admin.enabled = false;
    let gateway = bootstrap(&config).await.unwrap();
    let router = HttpServer::new(config, gateway).router();

    let request = Request::get("/admin/status")
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_KEY))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&router, request).await.status(), StatusCode::NOT_FOUND);
}
