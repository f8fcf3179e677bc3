//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use steam_gateway::config::{AdminConfig, GatewayConfig, SchedulerConfig, UpstreamConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const GOOD_KEY: &str = "TESTKEY";
pub const ADMIN_KEY: &str = "admin-secret";

pub const LISTING: &str = r#"{"apilist":{"interfaces":[
    {"name":"ISteamUser","methods":[
        {"name":"GetPlayerSummaries","version":2,"httpmethod":"GET","parameters":[
            {"name":"key","type":"string","optional":false},
            {"name":"steamids","type":"string","optional":false}]},
        {"name":"GetFriendList","version":1,"httpmethod":"GET","parameters":[
            {"name":"key","type":"string","optional":false},
            {"name":"steamid","type":"uint64","optional":false}]}]},
    {"name":"IEconDOTA2_570","methods":[
        {"name":"GetHeroes","version":1,"httpmethod":"GET","parameters":[
            {"name":"key","type":"string","optional":false},
            {"name":"language","type":"string","optional":true}]}]},
    {"name":"IDOTA2Match_570","methods":[
        {"name":"GetMatchHistory","version":1,"httpmethod":"GET","parameters":[
            {"name":"key","type":"string","optional":false}]},
        {"name":"GetMatchDetails","version":1,"httpmethod":"GET","parameters":[
            {"name":"key","type":"string","optional":false},
            {"name":"match_id","type":"uint64","optional":false}]}]},
    {"name":"ISteamUserAuth","methods":[
        {"name":"AuthenticateUser","version":1,"httpmethod":"POST","parameters":[]}]}
]}}"#;

/// One request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub path: String,
    pub query: HashMap<String, String>,
}

impl MockRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// Requests received so far.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<MockRequest>>>);

impl Journal {
    pub fn record(&self, request: &MockRequest) {
        self.0.lock().unwrap().push(request.clone());
    }

    pub fn hits(&self, path: &str) -> Vec<MockRequest> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn total(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let target = head.lines().next()?.split_whitespace().nth(1)?.to_string();
    let url = url::Url::parse(&format!("http://mock{}", target)).ok()?;

    Some(MockRequest {
        path: url.path().to_string(),
        query: url.query_pairs().into_owned().collect(),
    })
}

/// Start a programmable mock upstream on an ephemeral port.
pub async fn start_programmable_upstream<F, Fut>(journal: Journal, f: F) -> SocketAddr
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            let journal = journal.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                journal.record(&request);
                let (status, body) = f(request).await;

                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    status_text(status),
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Well-behaved Steam stand-in.
pub fn steam_response(request: &MockRequest) -> (u16, String) {
    if request.param("key") != Some(GOOD_KEY) {
        return (401, "<html><body><h1>Unauthorized</h1></body></html>".into());
    }
    match request.path.as_str() {
        "/IDOTA2Match_570/GetMatchDetails/v1/" => {
            (200, r#"{"result":{"error":"Match ID not found"}}"#.into())
        }
        "/ISteamWebAPIUtil/GetSupportedAPIList/v1/" => (200, LISTING.into()),
        "/ISteamUser/GetPlayerSummaries/v2/" => (
            200,
            format!(
                r#"{{"response":{{"players":[{{"steamid":"{}","personaname":"gaben"}}]}}}}"#,
                request.param("steamids").unwrap_or_default()
            ),
        ),
        "/IEconDOTA2_570/GetHeroes/v1/" => {
            (200, r#"{"result":{"heroes":[{"name":"npc_dota_hero_axe","id":2}],"count":1}}"#.into())
        }
        _ => (404, "Not Found".into()),
    }
}

/// Start the Steam stand-in, with `overrides` consulted first.
pub async fn start_steam<F>(journal: Journal, overrides: F) -> SocketAddr
where
    F: Fn(&MockRequest) -> Option<(u16, String)> + Send + Sync + 'static,
{
    let overrides = Arc::new(overrides);
    start_programmable_upstream(journal, move |request| {
        let overrides = overrides.clone();
        async move { overrides(&request).unwrap_or_else(|| steam_response(&request)) }
    })
    .await
}

/// Configuration pointing at a mock upstream with short timings.
pub fn test_config(upstream: SocketAddr) -> GatewayConfig {
    GatewayConfig {
        upstream: UpstreamConfig {
            base_url: format!("http://{}", upstream),
            api_key: GOOD_KEY.to_string(),
            request_timeout_secs: 1,
            ..UpstreamConfig::default()
        },
        scheduler: SchedulerConfig {
            dispatch_interval_ms: 20,
            busy_cooldown_secs: 30,
            busy_status: 503,
        },
        admin: AdminConfig {
            enabled: true,
            api_key: ADMIN_KEY.to_string(),
        },
        ..GatewayConfig::default()
    }
}

/// Send one request through the router.
pub async fn send(router: &axum::Router, request: Request<Body>) -> Response<Body> {
    tokio::time::timeout(Duration::from_secs(10), router.clone().oneshot(request))
        .await
        .expect("router did not answer in time")
        .unwrap()
}

pub async fn get(router: &axum::Router, uri: &str) -> Response<Body> {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
