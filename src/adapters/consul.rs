use crate::domain::model::Registration;
use crate::domain::ports::ServiceRegistry;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Consul agent HTTP API 的薄包裝。不重試，所有失敗都回傳 false。
#[derive(Debug, Clone)]
pub struct ConsulClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ServicePayload<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Tags")]
    tags: &'a [String],
    #[serde(rename = "Address")]
    address: &'a str,
    #[serde(rename = "Port")]
    port: u16,
    #[serde(rename = "Check", skip_serializing_if = "Option::is_none")]
    check: Option<CheckPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct CheckPayload<'a> {
    #[serde(rename = "DeregisterCriticalServiceAfter")]
    deregister_critical_service_after: &'a str,
    #[serde(rename = "HTTP")]
    http: String,
    #[serde(rename = "Interval")]
    interval: &'a str,
}

impl ConsulClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 註冊用的 service 文件，只有 check 啟用時才帶 `Check`
    fn payload(registration: &Registration) -> ServicePayload<'_> {
        let check = registration.check.enabled.then(|| CheckPayload {
            deregister_critical_service_after: registration
                .check
                .deregister_after_spec
                .as_deref()
                .unwrap_or_default(),
            http: registration.health_check_url(),
            interval: registration.check.interval_spec.as_deref().unwrap_or_default(),
        });

        ServicePayload {
            id: &registration.id,
            name: &registration.name,
            tags: &registration.tags,
            address: &registration.address,
            port: registration.port,
            check,
        }
    }

    /// body 序列化失敗時 reqwest 會在 send 回錯誤，一樣記成 false
    async fn send(&self, url: &str, request: RequestBuilder) -> bool {
        match request.send().await {
            Ok(response) if response.status() == StatusCode::OK => true,
            Ok(response) => {
                tracing::debug!("PUT {} returned {}", url, response.status());
                false
            }
            Err(e) => {
                tracing::debug!("PUT {} failed: {}", url, e);
                false
            }
        }
    }

    async fn fetch_services(&self) -> Option<HashMap<String, serde_json::Value>> {
        let url = format!("{}/v1/agent/services", self.base_url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("GET {} failed: {}", url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("GET {} returned {}", url, response.status());
            return None;
        }

        match response.json::<HashMap<String, serde_json::Value>>().await {
            Ok(services) => Some(services),
            Err(e) => {
                tracing::debug!("Malformed service list from {}: {}", url, e);
                None
            }
        }
    }
}

#[async_trait]
impl ServiceRegistry for ConsulClient {
    async fn register(&self, registration: &Registration) -> bool {
        let url = format!("{}/v1/agent/service/register", self.base_url);
        tracing::debug!("Registering {} at {}", registration.id, url);
        let request = self.client.put(&url).json(&Self::payload(registration));
        self.send(&url, request).await
    }

    async fn deregister(&self, id: &str) -> bool {
        let url = format!("{}/v1/agent/service/deregister/{}", self.base_url, id);
        tracing::debug!("Deregistering {} at {}", id, url);
        self.send(&url, self.client.put(&url)).await
    }

    async fn is_registered(&self, id: &str) -> bool {
        self.fetch_services()
            .await
            .is_some_and(|services| services.contains_key(id))
    }
}
