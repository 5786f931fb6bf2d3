//! An in-process stand-in for the collection API, served by axum on a
//! background thread.
//!
//! `/api/...` behaves like the real thing. The other prefixes misbehave:
//! `/broken` serves list entries that don't match the schema, `/slow` never
//! answers in time, `/empty` has no objects at all and `/stale` ignores the
//! `p` and `imgonly` parameters.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    io::{Read, Write},
    time::Duration,
};

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use collection::ApiConfig;
use serde_json::{json, Value};

pub const VALID_KEY: &str = "stub-key";

pub const OBJECT_COUNT: usize = 60;

/// Places the stub can filter on. Any other `place` is ignored, like an
/// unrecognised facet upstream.
const KNOWN_PLACES: [&str; 3] = ["Amsterdam", "Delft", "Haarlem"];

const MAKERS: [&str; 4] = [
    "Rembrandt van Rijn",
    "Johannes Vermeer",
    "Vincent van Gogh",
    "anonymous",
];

pub struct StubApi {
    root: String,
}

impl StubApi {
    pub fn start() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, router()).await.unwrap();
            });
        });
        Self {
            root: format!("http://{addr}"),
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}/api", self.root)
    }

    pub fn config(&self) -> ApiConfig {
        ApiConfig::new(self.base_url(), VALID_KEY).unwrap()
    }

    pub fn broken_config(&self) -> ApiConfig {
        ApiConfig::new(format!("{}/broken", self.root), VALID_KEY).unwrap()
    }

    pub fn slow_config(&self) -> ApiConfig {
        ApiConfig::new(format!("{}/slow", self.root), VALID_KEY)
            .unwrap()
            .with_timeout(Duration::from_millis(300))
    }

    pub fn empty_config(&self) -> ApiConfig {
        ApiConfig::new(format!("{}/empty", self.root), VALID_KEY).unwrap()
    }

    pub fn stale_config(&self) -> ApiConfig {
        ApiConfig::new(format!("{}/stale", self.root), VALID_KEY).unwrap()
    }
}

/// A bare TCP server that sends response headers and the start of a body,
/// then goes quiet. The returned config has a short timeout.
pub fn stalled_body_config() -> ApiConfig {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else {
                continue;
            };
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"artObjects\": [",
            );
            let _ = stream.flush();
            std::thread::sleep(Duration::from_secs(3));
        }
    });
    ApiConfig::new(format!("http://{addr}/api"), VALID_KEY)
        .unwrap()
        .with_timeout(Duration::from_millis(300))
}

fn router() -> Router {
    Router::new()
        .route("/api/:lang/collection", get(list_handler))
        .route("/api/:lang/collection/:object_number", get(detail_handler))
        .route("/broken/:lang/collection", get(broken_list_handler))
        .route("/slow/:lang/collection", get(slow_list_handler))
        .route("/empty/:lang/collection", get(empty_list_handler))
        .route("/stale/:lang/collection", get(stale_list_handler))
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "status": 401, "error": "Unauthorized", "message": message })),
    )
        .into_response()
}

fn check_key(params: &HashMap<String, String>) -> Option<Response> {
    match params.get("key").map(String::as_str) {
        None => Some(unauthorized("No key provided")),
        Some(VALID_KEY) => None,
        Some(_) => Some(unauthorized("Invalid key")),
    }
}

fn title(lang: &str, i: usize) -> String {
    match lang {
        "nl" => format!("Schilderij {i}"),
        _ => format!("Painting {i}"),
    }
}

fn places(i: usize) -> Vec<&'static str> {
    match i % 4 {
        0 => vec![],
        1 | 2 => vec!["Amsterdam"],
        _ => vec!["Delft", "Haarlem"],
    }
}

fn has_image(i: usize) -> bool {
    i % 3 != 0
}

fn web_image(i: usize) -> Value {
    if has_image(i) {
        json!({
            "guid": format!("guid-{i}"),
            "offsetPercentageX": 0,
            "offsetPercentageY": 12.5,
            "width": 2500,
            "height": 2034,
            "url": format!("https://images.example.org/SK-A-{i}=s0"),
        })
    } else {
        Value::Null
    }
}

fn list_entry(lang: &str, i: usize) -> Value {
    let maker = MAKERS[i % MAKERS.len()];
    json!({
        "links": {
            "self": format!("http://stub/api/{lang}/collection/SK-A-{i}"),
            "web": format!("http://stub/{lang}/collection/SK-A-{i}"),
        },
        "id": format!("{lang}-SK-A-{i}"),
        "objectNumber": format!("SK-A-{i}"),
        "title": title(lang, i),
        "hasImage": has_image(i),
        "principalOrFirstMaker": maker,
        "longTitle": format!("{}, {maker}, {}", title(lang, i), 1600 + i),
        "showImage": has_image(i),
        "permitDownload": true,
        "webImage": web_image(i),
        "headerImage": Value::Null,
        "productionPlaces": places(i),
    })
}

fn matches_query(i: usize, params: &HashMap<String, String>) -> bool {
    if let Some(q) = params.get("q") {
        let q = q.to_lowercase();
        let maker = MAKERS[i % MAKERS.len()].to_lowercase();
        if !maker.contains(&q) && !title("en", i).to_lowercase().contains(&q) {
            return false;
        }
    }
    if params.get("imgonly").map(String::as_str) == Some("true") && !has_image(i) {
        return false;
    }
    if let Some(place) = params
        .get("place")
        .filter(|place| KNOWN_PLACES.contains(&place.as_str()))
    {
        let places = places(i);
        if !places.is_empty() && !places.contains(&place.as_str()) {
            return false;
        }
    }
    true
}

async fn list_handler(
    Path(lang): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(response) = check_key(&params) {
        return response;
    }
    let page_size: usize = params.get("ps").and_then(|ps| ps.parse().ok()).unwrap_or(10);
    let page: usize = params.get("p").and_then(|p| p.parse().ok()).unwrap_or(1);
    let matching: Vec<usize> = (0..OBJECT_COUNT)
        .filter(|i| matches_query(*i, &params))
        .collect();
    let art_objects: Vec<Value> = matching
        .iter()
        .skip(page.max(1).saturating_sub(1) * page_size)
        .take(page_size)
        .map(|i| list_entry(&lang, *i))
        .collect();
    Json(json!({
        "elapsedMilliseconds": 0,
        "count": matching.len(),
        "artObjects": art_objects,
    }))
    .into_response()
}

async fn detail_handler(
    Path((lang, object_number)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(response) = check_key(&params) {
        return response;
    }
    let index = object_number
        .strip_prefix("SK-A-")
        .and_then(|i| i.parse::<usize>().ok())
        .filter(|i| *i < OBJECT_COUNT);
    let Some(i) = index else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": 404, "error": "Not Found" })),
        )
            .into_response();
    };
    Json(json!({
        "elapsedMilliseconds": 0,
        "artObject": {
            "id": format!("{lang}-SK-A-{i}"),
            "objectNumber": object_number,
            "title": title(&lang, i),
            "principalOrFirstMaker": MAKERS[i % MAKERS.len()],
            "description": Value::Null,
            "hasImage": has_image(i),
            "webImage": web_image(i),
            "productionPlaces": places(i),
        }
    }))
    .into_response()
}

async fn broken_list_handler(Query(params): Query<HashMap<String, String>>) -> Response {
    if let Some(response) = check_key(&params) {
        return response;
    }
    Json(json!({
        "artObjects": [
            { "objectNumber": "SK-A-1", "title": 42, "hasImage": true },
        ]
    }))
    .into_response()
}

async fn slow_list_handler() -> Response {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({ "artObjects": [] })).into_response()
}

async fn empty_list_handler(Query(params): Query<HashMap<String, String>>) -> Response {
    if let Some(response) = check_key(&params) {
        return response;
    }
    Json(json!({ "count": 0, "artObjects": [] })).into_response()
}

async fn stale_list_handler(
    Path(lang): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(response) = check_key(&params) {
        return response;
    }
    let page_size: usize = params.get("ps").and_then(|ps| ps.parse().ok()).unwrap_or(10);
    let art_objects: Vec<Value> = (0..page_size.min(OBJECT_COUNT))
        .map(|i| list_entry(&lang, i))
        .collect();
    Json(json!({
        "count": OBJECT_COUNT,
        "artObjects": art_objects,
    }))
    .into_response()
}
