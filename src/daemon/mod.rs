//! Daemon module - bootstrap and control of the external node process.
//!
//! Provides:
//! - An injected-capability view of the daemon binary and its control API
//! - The real kubo backend (subprocess + HTTP probe)
//! - The bootstrap procedure with stale-descriptor recovery
//! - The offline local-presence check

pub mod api;
pub mod backend;
pub mod kubo;
pub mod presence;
pub mod spawn;

pub use api::{ApiClient, ApiError};
pub use backend::{LaunchError, NodeBackend, NodeIdentity};
pub use kubo::KuboBackend;
pub use presence::has_local;
pub use spawn::{NodeHandle, SpawnLog, SpawnOptions, spawn, spawn_with_backend};
