pub mod sidecar;
pub mod supervisor;

pub use sidecar::{Sidecar, SidecarOptions};
