//! Bootstrap state-machine tests against a scripted backend.
//!
//! The backend trait replaces the real daemon process, so every branch of
//! the recovery procedure runs without spawning anything: probe refused →
//! descriptor removed → restart → success; non-refused failure → no
//! deletion, no retry; contract log lines in order.

use std::collections::VecDeque;
use std::fs;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ipfsd_rs::daemon::{ApiClient, ApiError};
use ipfsd_rs::{
    Error, Identity, LaunchError, NodeBackend, NodeDefaults, NodeIdentity, SpawnLog, SpawnOptions,
    SpawnProfile, spawn_with_backend,
};

// =============================================================================
// Fixture
// =============================================================================

/// Outcome script for successive probe calls.
#[derive(Debug)]
enum Probe {
    Ok,
    Refused,
    Malformed,
}

#[derive(Debug)]
struct FakeBackend {
    repo: PathBuf,
    probes: VecDeque<Probe>,
    start_calls: usize,
    init_calls: usize,
    /// Whether the api descriptor existed at the moment of each start call.
    descriptor_seen_at_start: Vec<bool>,
}

impl FakeBackend {
    fn new(repo: &Path, probes: Vec<Probe>) -> Self {
        Self {
            repo: repo.to_path_buf(),
            probes: probes.into(),
            start_calls: 0,
            init_calls: 0,
            descriptor_seen_at_start: Vec::new(),
        }
    }

    fn api_file(&self) -> PathBuf {
        self.repo.join("api")
    }

    fn identity() -> NodeIdentity {
        NodeIdentity {
            peer_id: "QmFakePeer".into(),
            addresses: vec![
                "/ip4/127.0.0.1/tcp/4001".into(),
                "/ip6/::1/tcp/4001".into(),
            ],
        }
    }

    /// Manufacture a genuine connection-refused probe error by dialing a
    /// port the OS just released.
    fn refused_error() -> ApiError {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);
        let client = ApiClient::from_multiaddr(&format!("/ip4/127.0.0.1/tcp/{port}"))
            .expect("client");
        client.id().expect_err("endpoint must be dead")
    }
}

impl NodeBackend for FakeBackend {
    fn path(&self) -> &Path {
        &self.repo
    }

    fn init(&mut self) -> Result<(), LaunchError> {
        self.init_calls += 1;
        let config = self.repo.join("config");
        if !config.exists() {
            fs::write(
                &config,
                r#"{"Identity": {"PeerID": "QmGenerated", "PrivKey": "k"}, "Datastore": {"StorageMax": "10GB"}}"#,
            )
            .expect("write generated config");
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), LaunchError> {
        self.start_calls += 1;
        self.descriptor_seen_at_start.push(self.api_file().exists());
        fs::write(self.api_file(), "/ip4/127.0.0.1/tcp/5001").expect("write descriptor");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), LaunchError> {
        Ok(())
    }

    fn id(&mut self) -> Result<NodeIdentity, ApiError> {
        match self.probes.pop_front().expect("unexpected probe call") {
            Probe::Ok => Ok(Self::identity()),
            Probe::Refused => Err(Self::refused_error()),
            Probe::Malformed => Err(ApiError::Malformed {
                addr: "/bad".into(),
            }),
        }
    }
}

#[derive(Default)]
struct LineCollector(Mutex<Vec<String>>);

impl SpawnLog for LineCollector {
    fn line(&self, line: &str) {
        self.0.lock().expect("log lock").push(line.to_owned());
    }
}

impl LineCollector {
    fn lines(&self) -> Vec<String> {
        self.0.lock().expect("log lock").clone()
    }
}

fn options(repo: &Path, log: Arc<LineCollector>) -> SpawnOptions {
    let mut opts = SpawnOptions::new(repo, "/unused/ipfs");
    opts.log = log;
    opts
}

// =============================================================================
// Happy path
// =============================================================================

#[test]
fn bootstrap_reports_identity_then_repo_then_addresses() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = Arc::new(LineCollector::default());
    let backend = FakeBackend::new(dir.path(), vec![Probe::Ok, Probe::Ok]);

    let mut handle =
        spawn_with_backend(backend, &options(dir.path(), log.clone())).expect("bootstrap");

    assert_eq!(handle.path(), dir.path());
    assert_eq!(handle.identity().peer_id, "QmFakePeer");
    assert_eq!(handle.identity().addresses.len(), 2);
    assert_eq!(
        log.lines(),
        vec![
            "[ipfsd] PeerID is QmFakePeer".to_owned(),
            format!("[ipfsd] Repo is at {}", dir.path().display()),
            "[ipfsd] Listening at /ip4/127.0.0.1/tcp/4001".to_owned(),
            "[ipfsd] Listening at /ip6/::1/tcp/4001".to_owned(),
        ]
    );
    assert_eq!(handle.backend().start_calls, 1);

    // The handle stays live for follow-up queries and lifecycle control.
    let requeried = handle.id().expect("live re-query");
    assert_eq!(&requeried, handle.identity());
    handle.stop().expect("stop");
}

// =============================================================================
// Recovery
// =============================================================================

#[test]
fn refused_probe_removes_descriptor_and_retries_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Stale descriptor left by a dead prior process.
    fs::write(dir.path().join("api"), "/ip4/127.0.0.1/tcp/1").expect("stale descriptor");

    let log = Arc::new(LineCollector::default());
    let backend = FakeBackend::new(dir.path(), vec![Probe::Refused, Probe::Ok]);

    let handle =
        spawn_with_backend(backend, &options(dir.path(), log.clone())).expect("bootstrap");

    // One recovery line, then the standard block.
    let lines = log.lines();
    assert_eq!(lines[0], "[daemon] removing api file");
    assert_eq!(lines[1], "[ipfsd] PeerID is QmFakePeer");
    assert_eq!(
        lines.iter().filter(|l| l.contains("removing api file")).count(),
        1
    );

    // Restarted exactly once, and the second start saw no descriptor.
    assert_eq!(handle.backend().start_calls, 2);
    assert!(!handle.backend().descriptor_seen_at_start[1]);
}

#[test]
fn second_refused_probe_surfaces_without_third_attempt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = Arc::new(LineCollector::default());
    let backend = FakeBackend::new(dir.path(), vec![Probe::Refused, Probe::Refused]);

    let err = spawn_with_backend(backend, &options(dir.path(), log.clone()))
        .expect_err("second refusal must surface");

    match err {
        Error::Launch(launch) => assert!(launch.is_connection_refused()),
        other => panic!("wrong error: {other}"),
    }
    // Exactly the one recovery line; the failed retry logs nothing more.
    assert_eq!(log.lines(), vec!["[daemon] removing api file".to_owned()]);
}

#[test]
fn non_refused_probe_failure_is_fatal_and_keeps_descriptor() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = Arc::new(LineCollector::default());
    let backend = FakeBackend::new(dir.path(), vec![Probe::Malformed]);

    let err = spawn_with_backend(backend, &options(dir.path(), log.clone()))
        .expect_err("malformed probe must surface");

    assert!(matches!(
        err,
        Error::Launch(LaunchError::Api(ApiError::Malformed { .. }))
    ));
    assert!(log.lines().is_empty(), "no log output on fatal failure");
    // The descriptor written by the single start call is untouched.
    assert!(dir.path().join("api").exists());
}

// =============================================================================
// Repository preparation
// =============================================================================

#[test]
fn supplied_identity_replaces_generated_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = Arc::new(LineCollector::default());
    let backend = FakeBackend::new(dir.path(), vec![Probe::Ok]);

    let mut opts = options(dir.path(), log);
    opts.identity = Some(Identity::new("QmSupplied"));
    spawn_with_backend(backend, &opts).expect("bootstrap");

    let raw = fs::read_to_string(dir.path().join("config")).expect("read config");
    let config: serde_json::Value = serde_json::from_str(&raw).expect("parse config");
    assert_eq!(config["Identity"]["PeerID"], "QmSupplied");
}

#[test]
fn generated_identity_and_foreign_sections_survive_patching() {
    let dir = tempfile::tempdir().expect("tempdir");

    let backend = FakeBackend::new(dir.path(), vec![Probe::Ok]);
    let opts = options(dir.path(), Arc::new(LineCollector::default()));
    spawn_with_backend(backend, &opts).expect("first bootstrap");
    let first = fs::read(dir.path().join("config")).expect("read config");

    // Second bootstrap over the same repo re-applies the same patch.
    let backend = FakeBackend::new(dir.path(), vec![Probe::Ok]);
    let opts = options(dir.path(), Arc::new(LineCollector::default()));
    spawn_with_backend(backend, &opts).expect("second bootstrap");
    let second = fs::read(dir.path().join("config")).expect("read config");

    assert_eq!(first, second, "re-patching must not change the config");

    let config: serde_json::Value = serde_json::from_slice(&second).expect("parse config");
    assert_eq!(config["Identity"]["PeerID"], "QmGenerated");
    assert_eq!(config["Identity"]["PrivKey"], "k");
    assert_eq!(config["Datastore"]["StorageMax"], "10GB");
    assert_eq!(config["Pubsub"]["Router"], "gossipsub");
}

#[test]
fn private_profile_writes_swarm_key_before_start() {
    let dir = tempfile::tempdir().expect("tempdir");
    let backend = FakeBackend::new(dir.path(), vec![Probe::Ok]);

    let mut opts = options(dir.path(), Arc::new(LineCollector::default()));
    *opts.profile.defaults_mut() = NodeDefaults::private_swarm();
    let handle = spawn_with_backend(backend, &opts).expect("bootstrap");

    let key = fs::read_to_string(dir.path().join("swarm.key")).expect("read swarm.key");
    assert_eq!(
        key,
        "/key/swarm/psk/1.0.0/\n/base16/\ncbad12031badbcad2a3cd5a373633fa725a7874de942d451227a9e909733454a"
    );
    assert_eq!(handle.backend().init_calls, 1);
}

#[test]
fn seed_and_patch_profiles_share_the_bootstrap_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let backend = FakeBackend::new(dir.path(), vec![Probe::Ok]);

    let mut opts = options(dir.path(), Arc::new(LineCollector::default()));
    opts.profile = SpawnProfile::patch("flatfs");
    spawn_with_backend(backend, &opts).expect("bootstrap");

    let raw = fs::read_to_string(dir.path().join("config")).expect("read config");
    assert!(raw.contains("gossipsub"));
}
