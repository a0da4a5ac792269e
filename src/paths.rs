//! Well-known file locations inside a daemon repository directory.

use std::path::{Path, PathBuf};

/// The daemon's config document.
pub fn config_path(repo: &Path) -> PathBuf {
    repo.join("config")
}

/// Control-API descriptor written by a running daemon.
///
/// Records the multiaddr of the live control endpoint; a leftover copy from
/// a crashed process is the stale-descriptor failure mode.
pub fn api_path(repo: &Path) -> PathBuf {
    repo.join("api")
}

/// Private-network pre-shared key sentinel.
pub fn swarm_key_path(repo: &Path) -> PathBuf {
    repo.join("swarm.key")
}

/// Default repository directory.
///
/// Uses `IPFS_PATH` if set, otherwise `~/.ipfs`.
pub fn default_repo_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("IPFS_PATH")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".ipfs")
}
