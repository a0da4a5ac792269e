//! Bootstrap procedure: prepare the repository, start the daemon, recover
//! from a stale api descriptor, hand back a live handle.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::api::ApiError;
use super::backend::{LaunchError, NodeBackend, NodeIdentity};
use super::kubo::KuboBackend;
use super::presence;
use crate::config::{self, Identity, SpawnProfile};
use crate::paths;

// =============================================================================
// Options and progress sink
// =============================================================================

/// Sink for the caller-facing progress lines.
///
/// These lines are contract (tests and callers match on them); ambient
/// diagnostics go through `tracing` instead.
pub trait SpawnLog: Send + Sync {
    fn line(&self, line: &str);
}

impl<F: Fn(&str) + Send + Sync> SpawnLog for F {
    fn line(&self, line: &str) {
        self(line)
    }
}

pub struct SpawnOptions {
    /// Repository directory the daemon will own.
    pub repo: PathBuf,
    /// Daemon executable.
    pub ipfs_bin: PathBuf,
    pub profile: SpawnProfile,
    /// Pre-existing identity to inject instead of keeping the generated one.
    pub identity: Option<Identity>,
    pub log: Arc<dyn SpawnLog>,
}

impl SpawnOptions {
    pub fn new(repo: impl Into<PathBuf>, ipfs_bin: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            ipfs_bin: ipfs_bin.into(),
            profile: SpawnProfile::default(),
            identity: None,
            log: Arc::new(|_: &str| {}),
        }
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Bootstrap a daemon with the real kubo backend.
pub fn spawn(opts: SpawnOptions) -> crate::Result<NodeHandle<KuboBackend>> {
    let backend = KuboBackend::new(
        opts.ipfs_bin.clone(),
        opts.repo.clone(),
        opts.profile.clone(),
    );
    spawn_with_backend(backend, &opts)
}

/// Bootstrap against an injected backend.
pub fn spawn_with_backend<B: NodeBackend>(
    mut backend: B,
    opts: &SpawnOptions,
) -> crate::Result<NodeHandle<B>> {
    prepare_repo(&mut backend, opts)?;
    let identity = start_with_recovery(&mut backend, opts.log.as_ref())?;
    Ok(NodeHandle { backend, identity })
}

// =============================================================================
// Bootstrap steps
// =============================================================================

/// Materialize the repository: init per profile, overlay the profile's
/// defaults onto the generated config, inject a supplied identity, and
/// drop the swarm key sentinel for private profiles.
fn prepare_repo<B: NodeBackend>(backend: &mut B, opts: &SpawnOptions) -> crate::Result<()> {
    config::ensure_repo_dir(backend.path())?;
    backend.init()?;

    let mut node_config = config::load_node_config(backend.path())?;
    config::apply_defaults(&mut node_config, opts.profile.defaults());
    if let Some(identity) = &opts.identity {
        node_config.identity = Some(identity.clone());
    }
    config::write_node_config(backend.path(), &node_config)?;

    if let Some(key) = &opts.profile.defaults().swarm_key {
        config::write_swarm_key(backend.path(), key)?;
    }
    Ok(())
}

/// Start and probe the daemon.
///
/// A connection-refused probe means a stale descriptor from a dead prior
/// process; remove it and retry exactly once. Any other failure, and any
/// failure on the retry, surfaces unchanged.
fn start_with_recovery<B: NodeBackend>(
    backend: &mut B,
    log: &dyn SpawnLog,
) -> Result<NodeIdentity, LaunchError> {
    backend.start()?;
    let identity = match backend.id() {
        Ok(identity) => identity,
        Err(err) if err.is_connection_refused() => {
            log.line("[daemon] removing api file");
            remove_api_file(backend.path())?;
            backend.start()?;
            backend.id()?
        }
        Err(err) => return Err(err.into()),
    };

    log.line(&format!("[ipfsd] PeerID is {}", identity.peer_id));
    log.line(&format!("[ipfsd] Repo is at {}", backend.path().display()));
    for address in &identity.addresses {
        log.line(&format!("[ipfsd] Listening at {address}"));
    }
    Ok(identity)
}

fn remove_api_file(repo: &Path) -> Result<(), LaunchError> {
    let path = paths::api_path(repo);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LaunchError::DescriptorRemove { path, source }),
    }
}

// =============================================================================
// Handle
// =============================================================================

/// A live daemon bound to its repository directory.
///
/// The daemon process outlives the handle; dropping it detaches. Call
/// [`NodeHandle::stop`] to actually shut the process down.
#[derive(Debug)]
pub struct NodeHandle<B: NodeBackend> {
    backend: B,
    identity: NodeIdentity,
}

impl<B: NodeBackend> NodeHandle<B> {
    pub fn path(&self) -> &Path {
        self.backend.path()
    }

    /// Identity captured by the bootstrap probe.
    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    /// Live identity re-query against the control API.
    pub fn id(&mut self) -> Result<NodeIdentity, ApiError> {
        self.backend.id()
    }

    pub fn stop(&mut self) -> Result<(), LaunchError> {
        self.backend.stop()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl NodeHandle<KuboBackend> {
    /// Offline local-presence oracle; see [`presence::has_local`].
    pub fn has_local(&self, cid: &str) -> bool {
        presence::has_local(self.backend.bin(), self.path(), cid)
    }
}
