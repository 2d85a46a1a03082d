// Domain layer: registration model and ports (registry + stats seams). No I/O here.

pub mod model;
pub mod ports;
