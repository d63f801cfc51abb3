#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Shared fixtures for the infos integration tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use infos::InfosModule;
use infos::config::InfosConfig;
use infos::domain::ports::{GeocodeError, GeocoderPort};
use infos::domain::repo::InfosRepository;
use infos::infra::storage::InMemoryInfosRepository;
use infos_sdk::GeoPoint;
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

pub const ARMONK: &str = "1 New Orchard Road, Armonk, 10504";
pub const ARMONK_GEO: &str = "41.109653,-73.72467";

pub fn armonk_point() -> GeoPoint {
    GeoPoint {
        lat: 41.109_653,
        lng: -73.724_67,
    }
}

/// Geocoder answering from a fixed table; unknown addresses have no match.
#[derive(Default)]
pub struct StubGeocoder {
    answers: Mutex<HashMap<String, Result<Vec<GeoPoint>, GeocodeError>>>,
    calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn new() -> Self {
        Self::default().with(ARMONK, vec![armonk_point()])
    }

    pub fn with(self, address: &str, points: Vec<GeoPoint>) -> Self {
        self.answers.lock().insert(address.to_owned(), Ok(points));
        self
    }

    pub fn failing(self, address: &str, error: GeocodeError) -> Self {
        self.answers.lock().insert(address.to_owned(), Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocoderPort for StubGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<GeoPoint>, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .get(address)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub fn test_config() -> InfosConfig {
    let mut cfg = InfosConfig::default();
    cfg.filter.prohibited_keys = vec!["badKey".to_owned()];
    cfg
}

pub fn module_with(repo: Arc<dyn InfosRepository>, geocoder: Arc<StubGeocoder>) -> InfosModule {
    InfosModule::from_parts(repo, geocoder, &test_config())
}

pub fn memory_module(geocoder: Arc<StubGeocoder>) -> InfosModule {
    module_with(Arc::new(InMemoryInfosRepository::new()), geocoder)
}

/// Percent-encode `json` as the value of query parameter `name`.
pub fn json_param(name: &str, json: &Value) -> String {
    serde_urlencoded::to_string([(name, json.to_string())]).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Value,
}

pub async fn send(router: &Router, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header(header::CONTENT_TYPE, "application/json");
    }
    let request = request
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_owned())))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_owned());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    TestResponse {
        status,
        content_type,
        body,
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Method::GET, uri, None).await
}

/// POST a reminder and return the stored record.
pub async fn given_info(router: &Router, body: &Value) -> Value {
    let res = send(router, Method::POST, "/infos", Some(&body.to_string())).await;
    assert_eq!(res.status, StatusCode::OK, "create failed: {}", res.body);
    res.body
}
