//! Shared test application for HTTP route tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use vitrina_kernel::store::MemoryStore;
use vitrina_kernel::{AppState, Config, routes};

/// Test application wrapper using the real routes over an in-memory store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Build an app serving `document` as its record store.
    pub fn new(document: &Value) -> Self {
        Self::with_config(document, Config::default())
    }

    pub fn with_config(document: &Value, config: Config) -> Self {
        let store = MemoryStore::from_document(document);
        let state = AppState::with_store(&config, Arc::new(store));
        let router = routes::app(state.clone(), &config);
        Self { router, state }
    }

    /// Send a request through the router.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// GET `uri` and return the status with the parsed JSON body.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .request(Request::get(uri).body(Body::empty()).unwrap())
            .await;
        let status = response.status();
        (status, response_json(response).await)
    }

    /// POST a JSON body to `uri`.
    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .request(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await;
        let status = response.status();
        (status, response_json(response).await)
    }
}

pub async fn response_json(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap_or_else(|_| {
        let text = String::from_utf8_lossy(&body);
        panic!("Failed to parse JSON: {text}");
    })
}
