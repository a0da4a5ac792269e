//! Typed view of the daemon's JSON config.
//!
//! Only the sections this crate manages are modeled; everything else rides
//! along in `#[serde(flatten)]` maps so a read-modify-write cycle never
//! drops fields owned by the daemon.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NodeConfig {
    #[serde(rename = "Identity", default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,

    #[serde(rename = "Bootstrap", default)]
    pub bootstrap: Vec<String>,

    #[serde(rename = "Swarm", default)]
    pub swarm: SwarmSection,

    #[serde(rename = "Pubsub", default)]
    pub pubsub: PubsubSection,

    #[serde(rename = "Discovery", default)]
    pub discovery: DiscoverySection,

    #[serde(rename = "API", default)]
    pub api: ApiSection,

    #[serde(rename = "Preload", default)]
    pub preload: PreloadSection,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Node keypair. Generated once at repository init and preserved across
/// patches; a caller-supplied identity replaces the generated one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "PeerID")]
    pub peer_id: String,

    #[serde(rename = "PrivKey", default, skip_serializing_if = "Option::is_none")]
    pub priv_key: Option<String>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Identity {
    pub fn new(peer_id: impl Into<String>) -> Self {
        Self {
            peer_id: peer_id.into(),
            priv_key: None,
            rest: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SwarmSection {
    #[serde(rename = "ConnMgr", default)]
    pub conn_mgr: ConnMgrConfig,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConnMgrConfig {
    #[serde(rename = "LowWater", default, skip_serializing_if = "Option::is_none")]
    pub low_water: Option<u32>,

    #[serde(rename = "HighWater", default, skip_serializing_if = "Option::is_none")]
    pub high_water: Option<u32>,

    #[serde(
        rename = "GracePeriod",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub grace_period: Option<String>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PubsubSection {
    #[serde(rename = "Router", default, skip_serializing_if = "Option::is_none")]
    pub router: Option<String>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DiscoverySection {
    #[serde(rename = "MDNS", default)]
    pub mdns: MdnsConfig,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MdnsConfig {
    #[serde(rename = "Enabled", default)]
    pub enabled: bool,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ApiSection {
    #[serde(rename = "HTTPHeaders", default)]
    pub http_headers: BTreeMap<String, Vec<String>>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PreloadSection {
    #[serde(rename = "Enabled", default)]
    pub enabled: bool,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}
