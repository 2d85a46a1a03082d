use crate::core::process::{CommandLine, Properties};
use crate::utils::error::{Result, SidecarError};
use crate::utils::validation::{validate_positive_number, Validate};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "consul-sidecar", version)]
#[command(about = "Keeps a Consul service registration alive next to a monitored process")]
#[command(
    after_help = "Example:\n  consul-sidecar -H 127.0.0.1 -c file:///etc/sidecar.toml -- java -jar app.jar"
)]
pub struct CliConfig {
    /// Host to bind the health endpoint to. Empty means all interfaces
    #[arg(short = 'H', long, default_value = "")]
    pub host: String,

    /// Fixed port. If empty a free port from portRange is used, this requires a configuration file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Configuration location: file:///path/to/config.toml or http(s)://url/to/config.toml
    #[arg(short, long)]
    pub config: Option<String>,

    /// Service name, wins against the value from the configuration file
    #[arg(short, long)]
    pub service_name: Option<String>,

    /// Process property available to $SYSTEM_PROPERTY("KEY") tags
    #[arg(short = 'D', long = "property", value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    /// Seconds between registration checks
    #[arg(long, default_value = "30")]
    pub check_interval: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,

    /// Monitored command. Its arguments feed $ARG(n), $CLASSNAME and the job tag
    #[arg(last = true)]
    pub command: Vec<String>,
}

impl CliConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval)
    }

    pub fn properties(&self) -> Properties {
        Properties::from_process().with_overrides(&self.properties)
    }

    /// 有指定子命令就用它，否則用 sidecar 自己的命令列
    pub fn command_line(&self) -> CommandLine {
        if self.command.is_empty() {
            CommandLine::new(std::env::args())
        } else {
            CommandLine::new(&self.command)
        }
    }
}

/// 參數錯誤和設定錯誤一樣 exit 1，`--help` / `--version` 則是 0
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("check_interval", self.check_interval, 1)?;
        if self.config.is_none() && self.port.is_none() {
            return Err(SidecarError::ConfigError {
                message: "No configuration has been given nor a port".to_string(),
            });
        }
        Ok(())
    }
}
