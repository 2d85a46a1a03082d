// Adapters layer: concrete implementations for external systems (consul http api, health endpoint).

pub mod consul;
pub mod health;
