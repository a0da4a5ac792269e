//! The real backend: a kubo binary driven over its CLI and control API.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use super::api::ApiClient;
use super::backend::{LaunchError, NodeBackend, NodeIdentity};
use crate::config::SpawnProfile;
use crate::paths;

/// How long a freshly started daemon gets to write its api descriptor.
const DESCRIPTOR_WAIT: Duration = Duration::from_secs(30);
const BACKOFF_START: Duration = Duration::from_millis(50);
const BACKOFF_MAX: Duration = Duration::from_millis(200);

pub struct KuboBackend {
    bin: PathBuf,
    repo: PathBuf,
    profile: SpawnProfile,
    child: Option<Child>,
}

impl KuboBackend {
    pub fn new(bin: PathBuf, repo: PathBuf, profile: SpawnProfile) -> Self {
        Self {
            bin,
            repo,
            profile,
            child: None,
        }
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Base command with the repository selected via `IPFS_PATH`.
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.env("IPFS_PATH", &self.repo);
        cmd
    }

    fn shutdown_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    /// Poll for the api descriptor while keeping an eye on the child: a
    /// daemon that dies before writing it fails fast instead of timing out.
    fn wait_for_descriptor(&mut self) -> Result<(), LaunchError> {
        let path = paths::api_path(&self.repo);
        let deadline = Instant::now() + DESCRIPTOR_WAIT;
        let mut backoff = BACKOFF_START;

        loop {
            if path.exists() {
                return Ok(());
            }
            if let Some(child) = &mut self.child
                && let Ok(Some(status)) = child.try_wait()
            {
                self.child = None;
                return Err(LaunchError::Exited(status.to_string()));
            }
            if Instant::now() >= deadline {
                return Err(LaunchError::DescriptorTimeout { path });
            }
            std::thread::sleep(backoff);
            backoff = std::cmp::min(backoff * 2, BACKOFF_MAX);
        }
    }
}

impl NodeBackend for KuboBackend {
    fn path(&self) -> &Path {
        &self.repo
    }

    fn init(&mut self) -> Result<(), LaunchError> {
        // An initialized repository already has its config; the daemon's
        // init refuses to run twice.
        if paths::config_path(&self.repo).exists() {
            return Ok(());
        }

        let mut cmd = self.command();
        cmd.arg("init");
        match &self.profile {
            SpawnProfile::Seed(seed) => {
                cmd.arg("--empty-repo")
                    .arg(format!("--bits={}", seed.key_bits));
            }
            SpawnProfile::Patch(patch) => {
                cmd.arg(format!("--profile={}", patch.preset));
            }
        }

        tracing::debug!(bin = %self.bin.display(), repo = %self.repo.display(), "running repo init");
        let output = cmd.output().map_err(|e| LaunchError::Init {
            bin: self.bin.clone(),
            detail: e.to_string(),
        })?;
        if !output.status.success() {
            return Err(LaunchError::Init {
                bin: self.bin.clone(),
                detail: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), LaunchError> {
        // A restart replaces the process we own; one daemon per repository.
        self.shutdown_child();

        let child = self
            .command()
            .arg("daemon")
            .arg("--enable-pubsub-experiment")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(LaunchError::Spawn)?;
        tracing::debug!(pid = child.id(), repo = %self.repo.display(), "daemon spawned");
        self.child = Some(child);

        self.wait_for_descriptor()
    }

    fn stop(&mut self) -> Result<(), LaunchError> {
        self.shutdown_child();
        Ok(())
    }

    fn id(&mut self) -> Result<NodeIdentity, super::api::ApiError> {
        ApiClient::from_repo(&self.repo)?.id()
    }
}
