use crate::utils::error::{Result, SidecarError};
use crate::utils::validation::validate_url;
use std::path::PathBuf;

/// 設定檔的位置：`file:///path` 或 `http(s)://...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Http(String),
}

impl ConfigSource {
    pub fn parse(location: &str) -> Result<Self> {
        let location = location.trim();
        let (scheme, rest) =
            location
                .split_once("://")
                .ok_or_else(|| SidecarError::ConfigSourceError {
                    location: location.to_string(),
                    reason: "The given file argument is not valid".to_string(),
                })?;

        match scheme {
            "file" => Ok(ConfigSource::File(PathBuf::from(rest))),
            "http" | "https" => {
                validate_url("config", location)?;
                Ok(ConfigSource::Http(location.to_string()))
            }
            other => Err(SidecarError::ConfigSourceError {
                location: location.to_string(),
                reason: format!("This type '{}' is not supported", other),
            }),
        }
    }

    /// 讀取原始設定內容
    pub async fn load(&self) -> Result<String> {
        match self {
            ConfigSource::File(path) => {
                if !path.is_file() {
                    return Err(SidecarError::ConfigSourceError {
                        location: path.display().to_string(),
                        reason: "File does not exist or is a directory".to_string(),
                    });
                }
                Ok(tokio::fs::read_to_string(path).await?)
            }
            ConfigSource::Http(url) => {
                tracing::debug!("Fetching configuration from {}", url);
                let response = reqwest::get(url).await?;
                if !response.status().is_success() {
                    return Err(SidecarError::ConfigSourceError {
                        location: url.clone(),
                        reason: format!("Server responded with {}", response.status()),
                    });
                }
                Ok(response.text().await?)
            }
        }
    }
}
