use crate::core::port::PortAllocator;
use crate::core::template::IdentityTemplateResolver;
use crate::domain::model::CheckPolicy;
use crate::utils::error::{Result, SidecarError};
use crate::utils::validation::{validate_port_range, validate_required_field, Validate};
use serde_json::{Map, Value};
use std::path::Path;

const CONSUL: &str = "consul";
const ENABLED: &str = "enabled";
const ADDRESS: &str = "address";
const PORT_RANGE: &str = "portRange";
const SERVICE_NAME: &str = "serviceName";
const EXPORTER_ADDRESS: &str = "exporterAddress";
const TAGS: &str = "tags";
const CHECK: &str = "check";
const CHECK_INTERVAL: &str = "checkInterval";
const DEREGISTER_PERIOD: &str = "deregisterPeriod";

/// `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    /// 解析 `"<start>-<end>"`
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = |reason: &str| SidecarError::InvalidConfigValueError {
            field: PORT_RANGE.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = value.split('-').collect();
        if parts.len() != 2 {
            return Err(invalid("Expected <startPort>-<endPort>"));
        }
        let start = parts[0]
            .trim()
            .parse::<u16>()
            .map_err(|_| invalid("Start port is not a valid port number"))?;
        let end = parts[1]
            .trim()
            .parse::<u16>()
            .map_err(|_| invalid("End port is not a valid port number"))?;

        validate_port_range(PORT_RANGE, start, end)?;
        Ok(Self { start, end })
    }
}

/// 啟動時建立一次、之後不變的服務設定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    pub enabled: bool,
    pub registry_address: Option<String>,
    pub port_range: Option<PortRange>,
    pub service_name: Option<String>,
    pub advertise_address: Option<String>,
    /// 原始 tag 表達式，尚未展開
    pub tags: Vec<String>,
    pub check: CheckPolicy,
}

impl ServiceConfig {
    /// 從已解析的 `consul` 區段建立設定
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let check = match map.get(CHECK) {
            Some(Value::Object(check)) => CheckPolicy {
                enabled: get_bool(check, ENABLED, "check.enabled")?.unwrap_or(false),
                interval_spec: get_string(check, CHECK_INTERVAL, "check.checkInterval")?,
                deregister_after_spec: get_string(
                    check,
                    DEREGISTER_PERIOD,
                    "check.deregisterPeriod",
                )?,
            },
            _ => CheckPolicy::default(),
        };

        let tags = match map.get(TAGS) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(SidecarError::InvalidConfigValueError {
                        field: TAGS.to_string(),
                        value: other.to_string(),
                        reason: "Tags must be strings".to_string(),
                    }),
                })
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        let config = Self {
            enabled: get_bool(map, ENABLED, ENABLED)?.unwrap_or(false),
            registry_address: get_string(map, ADDRESS, ADDRESS)?,
            port_range: get_string(map, PORT_RANGE, PORT_RANGE)?
                .map(|range| PortRange::parse(&range))
                .transpose()?,
            service_name: get_string(map, SERVICE_NAME, SERVICE_NAME)?,
            advertise_address: get_string(map, EXPORTER_ADDRESS, EXPORTER_ADDRESS)?,
            tags,
            check,
        };

        config.validate()?;
        Ok(config)
    }

    /// 解析 TOML 文件，設定放在 `[consul]` 表格下；沒有這個表格時回傳預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let document: toml::Table = toml::from_str(content)?;

        match document.get(CONSUL) {
            Some(toml::Value::Table(section)) => {
                let map = match serde_json::to_value(section) {
                    Ok(Value::Object(map)) => map,
                    _ => Map::new(),
                };
                Self::from_map(&map)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 空白或未設定的 serviceName 視為沒有
    pub fn display_name(&self) -> Option<&str> {
        self.service_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    /// 展開使用者 tag 並附加 job/user tag，不論是否啟用註冊
    pub fn resolved_tags(&self, resolver: &IdentityTemplateResolver) -> Vec<String> {
        resolver.resolve_tags(&self.tags)
    }

    /// 有外部指定的 port 就用固定綁定，否則掃描 portRange
    pub fn port_allocator(&self, host: &str, fixed_port: Option<u16>) -> Result<PortAllocator> {
        if let Some(port) = fixed_port {
            return Ok(PortAllocator::Fixed {
                host: host.to_string(),
                port,
            });
        }

        if !self.enabled {
            return Err(SidecarError::ConfigError {
                message: "No valid port has been given, but the consul section is disabled"
                    .to_string(),
            });
        }

        let range = validate_required_field(PORT_RANGE, &self.port_range)?;
        Ok(PortAllocator::Range {
            host: host.to_string(),
            start: range.start,
            end: range.end,
        })
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        if self.enabled {
            validate_required_field(ADDRESS, &self.registry_address)?;
            validate_required_field(PORT_RANGE, &self.port_range)?;
        }
        Ok(())
    }
}

fn get_bool(map: &Map<String, Value>, key: &str, field: &str) -> Result<Option<bool>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(SidecarError::InvalidConfigValueError {
            field: field.to_string(),
            value: other.to_string(),
            reason: "Expected a boolean".to_string(),
        }),
    }
}

fn get_string(map: &Map<String, Value>, key: &str, field: &str) -> Result<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(SidecarError::InvalidConfigValueError {
            field: field.to_string(),
            value: other.to_string(),
            reason: "Expected a string".to_string(),
        }),
    }
}
