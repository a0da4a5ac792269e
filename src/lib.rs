#![forbid(unsafe_code)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
mod paths;
pub mod telemetry;

pub use error::{Error, Transience};
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the spawn surface at the crate root for convenience
pub use crate::config::{
    Identity, NodeConfig, NodeDefaults, PatchProfile, SeedProfile, SpawnProfile, SwarmKey,
};
pub use crate::daemon::{
    ApiClient, ApiError, KuboBackend, LaunchError, NodeBackend, NodeHandle, NodeIdentity,
    SpawnLog, SpawnOptions, spawn, spawn_with_backend,
};
