use crate::config::ServiceConfig;
use crate::core::port::{is_wildcard_host, BoundPort};
use crate::domain::model::Registration;

/// 每次啟動產生新的 id，整個 process 生命週期內不變
pub fn new_registration_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 機器的 hostname，取不到時用 `localhost`
pub fn local_hostname() -> String {
    sysinfo::System::host_name()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// 發佈到 registry 的位址：設定值 > 綁定的 host > 本機 hostname（綁定在 wildcard 時）
pub fn advertise_address(configured: Option<&str>, bind_host: &str) -> String {
    match configured.filter(|address| !address.trim().is_empty()) {
        Some(address) => address.to_string(),
        None if is_wildcard_host(bind_host) => local_hostname(),
        None => bind_host.to_string(),
    }
}

pub fn build_registration(
    id: String,
    config: &ServiceConfig,
    bound: &BoundPort,
    tags: Vec<String>,
) -> Registration {
    let name = config
        .display_name()
        .map(str::to_string)
        .unwrap_or_else(|| id.clone());

    Registration {
        name,
        address: advertise_address(config.advertise_address.as_deref(), &bound.host),
        port: bound.port(),
        tags,
        check: config.check.clone(),
        id,
    }
}
