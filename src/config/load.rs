//! Config and swarm-key persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::profile::SwarmKey;
use super::schema::NodeConfig;
use crate::paths;

/// Filesystem or parse failure while preparing the repository. Fatal:
/// there is no recovery at this layer.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid swarm key: {reason}")]
    InvalidSwarmKey { reason: String },
}

/// Ensure the repository directory exists.
pub(crate) fn ensure_repo_dir(repo: &Path) -> Result<(), ConfigError> {
    fs::create_dir_all(repo).map_err(|source| ConfigError::CreateDir {
        path: repo.to_path_buf(),
        source,
    })
}

pub fn load_node_config(repo: &Path) -> Result<NodeConfig, ConfigError> {
    let path = paths::config_path(repo);
    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

pub fn write_node_config(repo: &Path, config: &NodeConfig) -> Result<(), ConfigError> {
    let path = paths::config_path(repo);
    let mut contents = serde_json::to_string_pretty(config).map_err(|source| {
        ConfigError::Parse {
            path: path.clone(),
            source,
        }
    })?;
    contents.push('\n');
    atomic_write(&path, contents.as_bytes())
}

/// Write the pre-shared key sentinel. The rendered bytes are the file,
/// exactly; the daemon picks it up at next start.
pub fn write_swarm_key(repo: &Path, key: &SwarmKey) -> Result<(), ConfigError> {
    atomic_write(&paths::swarm_key_path(repo), key.render().as_bytes())
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().ok_or_else(|| {
        write_err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path missing parent directory",
        ))
    })?;
    let temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    fs::write(temp.path(), data).map_err(write_err)?;
    temp.persist(path)
        .map_err(|e| write_err(e.error))
        .map(|_| ())
}
