pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::consul::ConsulClient;
pub use app::{Sidecar, SidecarOptions};
pub use config::{ConfigSource, ServiceConfig};
pub use self::core::{port::PortAllocator, reconciler::Reconciler, template::IdentityTemplateResolver};
pub use utils::error::{Result, SidecarError};
