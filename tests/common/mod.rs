#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

/// 記憶體內的 Consul agent，只實作 sidecar 用到的三個 endpoint
#[derive(Clone, Default)]
pub struct FakeConsul {
    services: Arc<Mutex<Map<String, Value>>>,
    register_count: Arc<Mutex<usize>>,
}

impl FakeConsul {
    pub async fn start() -> (Self, String) {
        let fake = Self::default();
        let app = Router::new()
            .route("/v1/agent/service/register", put(register))
            .route("/v1/agent/service/deregister/:id", put(deregister))
            .route("/v1/agent/services", get(services))
            .with_state(fake.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (fake, format!("http://{}", addr))
    }

    pub fn service(&self, id: &str) -> Option<Value> {
        self.services.lock().unwrap().get(id).cloned()
    }

    pub fn service_ids(&self) -> Vec<String> {
        self.services.lock().unwrap().keys().cloned().collect()
    }

    /// 模擬 registry 自己把服務清掉
    pub fn evict(&self, id: &str) {
        self.services.lock().unwrap().remove(id);
    }

    pub fn register_count(&self) -> usize {
        *self.register_count.lock().unwrap()
    }
}

async fn register(State(fake): State<FakeConsul>, Json(body): Json<Value>) -> StatusCode {
    match body.get("ID").and_then(Value::as_str) {
        Some(id) => {
            fake.services
                .lock()
                .unwrap()
                .insert(id.to_string(), body.clone());
            *fake.register_count.lock().unwrap() += 1;
            StatusCode::OK
        }
        None => StatusCode::BAD_REQUEST,
    }
}

async fn deregister(State(fake): State<FakeConsul>, Path(id): Path<String>) -> StatusCode {
    fake.services.lock().unwrap().remove(&id);
    StatusCode::OK
}

async fn services(State(fake): State<FakeConsul>) -> Json<Value> {
    Json(Value::Object(fake.services.lock().unwrap().clone()))
}

pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(std::time::Duration::from_secs(10), async {
        while !condition() {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
