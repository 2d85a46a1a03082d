pub mod identity;
pub mod port;
pub mod process;
pub mod reconciler;
pub mod template;

pub use crate::domain::model::{CheckPolicy, Registration};
pub use crate::domain::ports::{ServiceRegistry, StatsRecorder};
pub use crate::utils::error::Result;
