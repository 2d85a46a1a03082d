#[cfg(feature = "cli")]
pub mod cli;
pub mod service_config;
pub mod source;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use service_config::{PortRange, ServiceConfig};
pub use source::ConfigSource;
