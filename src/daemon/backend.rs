//! The external daemon as an injected capability.
//!
//! Bootstrap logic only ever talks to a [`NodeBackend`], so the whole
//! procedure runs against a fake in tests without spawning a process.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::api::ApiError;
use crate::Transience;

/// One daemon instance bound to one repository directory.
///
/// `init` and `start` must be safe to call again after a failed probe;
/// a restart replaces any process the backend still owns.
pub trait NodeBackend {
    /// The repository directory this backend owns.
    fn path(&self) -> &Path;

    /// Initialize the repository (keys + generated config). A no-op when
    /// the repository is already initialized.
    fn init(&mut self) -> Result<(), LaunchError>;

    /// Start the daemon process and wait until its control descriptor is
    /// in place.
    fn start(&mut self) -> Result<(), LaunchError>;

    /// Stop the daemon process, if one is running.
    fn stop(&mut self) -> Result<(), LaunchError>;

    /// Liveness probe: query the control API for the node's identity.
    fn id(&mut self) -> Result<NodeIdentity, ApiError>;
}

/// Identity answer from the control API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeIdentity {
    #[serde(rename = "ID")]
    pub peer_id: String,

    /// Advertised listen addresses, in the order the API returned them.
    #[serde(rename = "Addresses", default)]
    pub addresses: Vec<String>,
}

/// Failure while launching or probing the daemon.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("`{bin} init` failed: {detail}")]
    Init { bin: PathBuf, detail: String },

    #[error("failed to spawn daemon: {0}")]
    Spawn(#[source] io::Error),

    #[error("daemon exited during startup: {0}")]
    Exited(String),

    #[error("timed out waiting for api descriptor at {path}")]
    DescriptorTimeout { path: PathBuf },

    #[error("failed to remove api descriptor {path}: {source}")]
    DescriptorRemove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl LaunchError {
    /// The single recoverable probe failure: the control endpoint refused
    /// the connection.
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, LaunchError::Api(err) if err.is_connection_refused())
    }

    pub fn transience(&self) -> Transience {
        match self {
            LaunchError::Api(err) if err.is_connection_refused() => Transience::Retryable,
            LaunchError::DescriptorTimeout { .. } => Transience::Retryable,
            LaunchError::Exited(_) | LaunchError::Spawn(_) => Transience::Unknown,
            _ => Transience::Permanent,
        }
    }
}
