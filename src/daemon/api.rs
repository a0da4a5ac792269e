//! Minimal control-API client.
//!
//! The daemon advertises its control endpoint as a multiaddr in the `api`
//! descriptor file; this client turns that into an HTTP base and issues
//! the identity query used as the liveness probe.

use std::error::Error as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use super::backend::NodeIdentity;
use crate::paths;

const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to read api descriptor {path}: {source}")]
    Descriptor {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed api multiaddr: {addr:?}")]
    Malformed { addr: String },

    #[error("api request failed: {0}")]
    Http(#[source] reqwest::Error),
}

impl ApiError {
    pub fn is_connection_refused(&self) -> bool {
        match self {
            ApiError::Http(err) => io_kind(err) == Some(io::ErrorKind::ConnectionRefused),
            _ => false,
        }
    }
}

/// Walk the source chain down to the underlying io error, if any.
fn io_kind(err: &reqwest::Error) -> Option<io::ErrorKind> {
    let mut source = err.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = err.source();
    }
    None
}

pub struct ApiClient {
    base: String,
    http: reqwest::blocking::Client,
}

impl ApiClient {
    /// Build a client from the repository's `api` descriptor file.
    pub fn from_repo(repo: &Path) -> Result<Self, ApiError> {
        let path = paths::api_path(repo);
        let addr = fs::read_to_string(&path).map_err(|source| ApiError::Descriptor {
            path: path.clone(),
            source,
        })?;
        Self::from_multiaddr(addr.trim())
    }

    pub fn from_multiaddr(addr: &str) -> Result<Self, ApiError> {
        let base = http_base(addr)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(ApiError::Http)?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `POST /api/v0/id` — peer identity and advertised listen addresses.
    pub fn id(&self) -> Result<NodeIdentity, ApiError> {
        self.http
            .post(format!("{}/api/v0/id", self.base))
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<NodeIdentity>())
            .map_err(ApiError::Http)
    }
}

/// Map the descriptor multiaddr onto an HTTP origin.
///
/// Only the TCP shapes the daemon actually writes are accepted; anything
/// else is a malformed descriptor.
fn http_base(addr: &str) -> Result<String, ApiError> {
    let parts: Vec<&str> = addr.split('/').collect();
    match parts.as_slice() {
        ["", "ip4" | "dns" | "dns4" | "dns6", host, "tcp", port, ..]
            if !host.is_empty() && port.parse::<u16>().is_ok() =>
        {
            Ok(format!("http://{host}:{port}"))
        }
        ["", "ip6", host, "tcp", port, ..] if !host.is_empty() && port.parse::<u16>().is_ok() => {
            Ok(format!("http://[{host}]:{port}"))
        }
        _ => Err(ApiError::Malformed {
            addr: addr.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Read, Write};
    use std::net::TcpListener;

    #[test]
    fn http_base_accepts_daemon_shapes() {
        assert_eq!(
            http_base("/ip4/127.0.0.1/tcp/5001").unwrap(),
            "http://127.0.0.1:5001"
        );
        assert_eq!(
            http_base("/dns4/localhost/tcp/5001").unwrap(),
            "http://localhost:5001"
        );
        assert_eq!(http_base("/ip6/::1/tcp/5001").unwrap(), "http://[::1]:5001");
    }

    #[test]
    fn http_base_rejects_garbage() {
        for addr in ["", "/ip4/127.0.0.1", "/unix/tmp/api.sock", "/ip4//tcp/x"] {
            assert!(matches!(
                http_base(addr),
                Err(ApiError::Malformed { .. })
            ));
        }
    }

    #[test]
    fn id_decodes_identity_response() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let body = r#"{"ID":"QmProbe","Addresses":["/ip4/127.0.0.1/tcp/4001"],"AgentVersion":"kubo/0.1"}"#;

        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).expect("respond");
        });

        let client = ApiClient::from_multiaddr(&format!("/ip4/127.0.0.1/tcp/{port}"))
            .expect("client");
        assert_eq!(client.base_url(), format!("http://127.0.0.1:{port}"));
        let identity = client.id().expect("probe");
        assert_eq!(identity.peer_id, "QmProbe");
        assert_eq!(identity.addresses, vec!["/ip4/127.0.0.1/tcp/4001"]);
        server.join().expect("server thread");
    }

    #[test]
    fn dead_endpoint_reads_as_connection_refused() {
        // Grab a port the OS just released so nothing is listening on it.
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let client = ApiClient::from_multiaddr(&format!("/ip4/127.0.0.1/tcp/{port}"))
            .expect("client");
        let err = client.id().expect_err("must fail");
        assert!(err.is_connection_refused(), "got: {err:?}");
    }

    #[test]
    fn malformed_descriptor_is_not_refused() {
        let err = ApiError::Malformed {
            addr: "/nope".into(),
        };
        assert!(!err.is_connection_refused());
    }
}
