//! Offline local-presence oracle.

use std::path::Path;
use std::process::Command;

/// Whether `cid` is already present in the local repository, without any
/// network fetch.
///
/// Runs the daemon binary's offline block-stat query directly, bypassing
/// the control API. Returns `true` only when the query exits cleanly and
/// its output carries no error marker; every other outcome — including a
/// failure to run the binary at all — collapses to `false`. Callers learn
/// "not confirmed present", never why; that boolean contract is part of
/// the compatibility surface of this function.
pub fn has_local(ipfs_bin: &Path, repo: &Path, cid: &str) -> bool {
    let output = Command::new(ipfs_bin)
        .env("IPFS_PATH", repo)
        .args(["block", "stat", "--offline", cid])
        .output();

    let Ok(output) = output else {
        return false;
    };
    if !output.status.success() {
        return false;
    }
    !contains_error(&output.stdout) && !contains_error(&output.stderr)
}

fn contains_error(bytes: &[u8]) -> bool {
    String::from_utf8_lossy(bytes)
        .to_lowercase()
        .contains("error")
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    fn stub_bin(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("ipfs");
        fs::write(&path, script).expect("write stub");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    #[test]
    fn clean_exit_with_stat_output_is_present() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = stub_bin(dir.path(), "#!/bin/sh\necho 'Key: QmX'\necho 'Size: 12'\n");
        assert!(has_local(&bin, dir.path(), "QmX"));
    }

    #[test]
    fn nonzero_exit_is_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = stub_bin(
            dir.path(),
            "#!/bin/sh\necho 'Error: blockstore: block not found' >&2\nexit 1\n",
        );
        assert!(!has_local(&bin, dir.path(), "QmX"));
    }

    #[test]
    fn error_marker_in_output_is_absent_even_on_clean_exit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = stub_bin(dir.path(), "#!/bin/sh\necho 'ERROR: not found'\nexit 0\n");
        assert!(!has_local(&bin, dir.path(), "QmX"));
    }

    #[test]
    fn missing_binary_is_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(!has_local(
            Path::new("/nonexistent/ipfs"),
            dir.path(),
            "QmX"
        ));
    }
}
