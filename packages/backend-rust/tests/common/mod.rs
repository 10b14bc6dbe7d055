#![allow(dead_code)]

use affinity_algo::DomainIndex;
use affinity_backend::services::AffinityService;
use affinity_backend::store::Stores;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub fn test_domains() -> DomainIndex {
    DomainIndex::new(["math", "physics"])
}

pub fn test_service() -> AffinityService {
    AffinityService::new(Stores::memory(), test_domains())
}

pub fn create_test_app() -> Router {
    affinity_backend::create_app_with(test_service(), None)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
