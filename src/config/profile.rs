//! Spawn profiles: the declarative payload a bootstrap applies to a repo.
//!
//! The defaults here used to live as embedded literals in several
//! near-identical launch paths; they are named values so one bootstrap
//! procedure can serve every variant.

use std::collections::BTreeMap;

use super::load::ConfigError;

/// Bootstrap peer joined by every public-profile node.
pub const DEFAULT_BOOTSTRAP_PEER: &str =
    "/ip4/206.189.77.125/tcp/4001/p2p/QmbxBgAFuyfM1upC72GujTNJeKDKg8nbMnbt3SUX8hrFWm";

/// Connection-manager watermarks for the standard profile.
pub const DEFAULT_LOW_WATER: u32 = 20;
pub const DEFAULT_HIGH_WATER: u32 = 100;

/// Connection-manager watermarks for private-swarm members, which keep a
/// denser mesh.
pub const PRIVATE_LOW_WATER: u32 = 50;
pub const PRIVATE_HIGH_WATER: u32 = 300;

/// Grace period granted to new connections before the connection manager
/// may prune them. Carried as the daemon's own duration syntax.
pub const DEFAULT_GRACE_PERIOD: &str = "20s";

/// Pubsub router selected for every profile.
pub const GOSSIPSUB_ROUTER: &str = "gossipsub";

/// RSA key size for seed-mode repository init.
pub const DEFAULT_KEY_BITS: u32 = 2048;

/// Pre-shared key for the built-in private swarm.
pub const PRIVATE_SWARM_PSK: &str =
    "cbad12031badbcad2a3cd5a373633fa725a7874de942d451227a9e909733454a";

/// How a repository is initialized before the daemon starts.
#[derive(Debug, Clone)]
pub enum SpawnProfile {
    /// Fresh empty-keystore init carrying the full default config.
    Seed(SeedProfile),
    /// Init with a named storage-profile preset, then patch the generated
    /// config in place.
    Patch(PatchProfile),
}

impl SpawnProfile {
    /// Standard seed profile: 2048-bit keys, public defaults.
    pub fn seed() -> Self {
        SpawnProfile::Seed(SeedProfile {
            key_bits: DEFAULT_KEY_BITS,
            defaults: NodeDefaults::standard(),
        })
    }

    /// Patch profile over a named storage preset, public defaults.
    pub fn patch(preset: impl Into<String>) -> Self {
        SpawnProfile::Patch(PatchProfile {
            preset: preset.into(),
            defaults: NodeDefaults::standard(),
        })
    }

    pub fn defaults(&self) -> &NodeDefaults {
        match self {
            SpawnProfile::Seed(p) => &p.defaults,
            SpawnProfile::Patch(p) => &p.defaults,
        }
    }

    pub fn defaults_mut(&mut self) -> &mut NodeDefaults {
        match self {
            SpawnProfile::Seed(p) => &mut p.defaults,
            SpawnProfile::Patch(p) => &mut p.defaults,
        }
    }
}

impl Default for SpawnProfile {
    fn default() -> Self {
        Self::seed()
    }
}

#[derive(Debug, Clone)]
pub struct SeedProfile {
    pub key_bits: u32,
    pub defaults: NodeDefaults,
}

#[derive(Debug, Clone)]
pub struct PatchProfile {
    /// Storage-profile preset name handed to the daemon's init.
    pub preset: String,
    pub defaults: NodeDefaults,
}

/// Default config payload a profile overlays onto the repository config.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDefaults {
    pub bootstrap: Vec<String>,
    pub conn_mgr: ConnMgrDefaults,
    pub pubsub_router: String,
    pub mdns: bool,
    pub preload: bool,
    pub api_headers: BTreeMap<String, Vec<String>>,
    pub swarm_key: Option<SwarmKey>,
}

impl NodeDefaults {
    /// Public-network defaults: one bootstrap peer, 20/100 watermarks,
    /// gossipsub, mDNS on, preload off.
    pub fn standard() -> Self {
        Self {
            bootstrap: vec![DEFAULT_BOOTSTRAP_PEER.to_owned()],
            conn_mgr: ConnMgrDefaults {
                low_water: DEFAULT_LOW_WATER,
                high_water: DEFAULT_HIGH_WATER,
                grace_period: Some(DEFAULT_GRACE_PERIOD.to_owned()),
            },
            pubsub_router: GOSSIPSUB_ROUTER.to_owned(),
            mdns: true,
            preload: false,
            api_headers: BTreeMap::new(),
            swarm_key: None,
        }
    }

    /// Private-swarm defaults: built-in pre-shared key and denser watermarks.
    pub fn private_swarm() -> Self {
        Self {
            conn_mgr: ConnMgrDefaults {
                low_water: PRIVATE_LOW_WATER,
                high_water: PRIVATE_HIGH_WATER,
                grace_period: Some(DEFAULT_GRACE_PERIOD.to_owned()),
            },
            swarm_key: Some(SwarmKey {
                hex: PRIVATE_SWARM_PSK.to_owned(),
            }),
            ..Self::standard()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnMgrDefaults {
    pub low_water: u32,
    pub high_water: u32,
    pub grace_period: Option<String>,
}

/// Private-network pre-shared key, written verbatim to `swarm.key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwarmKey {
    hex: String,
}

impl SwarmKey {
    /// Accepts exactly 64 hex characters.
    pub fn new(hex: impl Into<String>) -> Result<Self, ConfigError> {
        let hex = hex.into();
        if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidSwarmKey {
                reason: format!("expected 64 hex characters, got {:?}", hex),
            });
        }
        Ok(Self { hex })
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// The exact `swarm.key` file contents. No trailing newline: the daemon
    /// reads the key line to end-of-file.
    pub fn render(&self) -> String {
        format!("/key/swarm/psk/1.0.0/\n/base16/\n{}", self.hex)
    }
}
