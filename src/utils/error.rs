use thiserror::Error;

#[derive(Error, Debug)]
pub enum SidecarError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("The {field} field is mandatory if consul is enabled")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Cannot load configuration from '{location}': {reason}")]
    ConfigSourceError { location: String, reason: String },

    #[error("No free port could be found in range {start}-{end}")]
    NoFreePort { start: u16, end: u16 },

    #[error("Cannot bind {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

impl SidecarError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            SidecarError::MissingConfigError { field } => {
                format!("The {} field is mandatory if consul is enabled", field)
            }
            SidecarError::InvalidConfigValueError { field, value, .. } => {
                format!("The given {} is invalid. Given: {}", field, value)
            }
            SidecarError::NoFreePort { .. } => "No free port could be found".to_string(),
            SidecarError::TomlError(_) => "Configfile does not contain valid TOML".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SidecarError::MissingConfigError { .. } => {
                "Add the missing key to the [consul] section or set enabled = false"
            }
            SidecarError::InvalidConfigValueError { .. } => {
                "Check the value type; portRange must look like \"5000-6000\""
            }
            SidecarError::ConfigSourceError { .. } => {
                "Use file:///path/to/config.toml or http(s)://host/config.toml"
            }
            SidecarError::NoFreePort { .. } => "Widen portRange or pass a fixed port with -p",
            SidecarError::BindError { .. } => "Make sure the host/port is free and reachable",
            SidecarError::TomlError(_) => "Make sure the file is valid TOML format",
            SidecarError::HttpError(_) => "Check that the configuration URL is reachable",
            SidecarError::IoError(_) | SidecarError::ConfigError { .. } => {
                "Run with --help for usage"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SidecarError>;
