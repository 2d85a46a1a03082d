use serde::{Deserialize, Serialize};

/// Consul 主動健康檢查的設定，interval/deregister 字串原封不動交給 registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckPolicy {
    pub enabled: bool,
    pub interval_spec: Option<String>,
    pub deregister_after_spec: Option<String>,
}

/// 一次 process 生命週期內固定不變的註冊內容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub id: String,
    pub name: String,
    pub address: String,
    pub port: u16,
    pub tags: Vec<String>,
    pub check: CheckPolicy,
}

impl Registration {
    /// Consul 會打這個 URL 做健康檢查，health server 必須在 `/<id>` 回應
    pub fn health_check_url(&self) -> String {
        format!("http://{}:{}/{}", self.address, self.port, self.id)
    }
}
