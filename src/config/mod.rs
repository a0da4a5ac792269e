//! The daemon's repository config document: schema, profiles, persistence.

mod load;
mod merge;
mod profile;
mod schema;

pub use load::{ConfigError, load_node_config, write_node_config, write_swarm_key};
pub(crate) use load::ensure_repo_dir;
pub use merge::apply_defaults;
pub use profile::{
    ConnMgrDefaults, DEFAULT_BOOTSTRAP_PEER, DEFAULT_GRACE_PERIOD, DEFAULT_HIGH_WATER,
    DEFAULT_KEY_BITS, DEFAULT_LOW_WATER, GOSSIPSUB_ROUTER, NodeDefaults, PatchProfile,
    PRIVATE_HIGH_WATER, PRIVATE_LOW_WATER, PRIVATE_SWARM_PSK, SeedProfile, SpawnProfile, SwarmKey,
};
pub use schema::{
    ApiSection, ConnMgrConfig, DiscoverySection, Identity, MdnsConfig, NodeConfig, PreloadSection,
    PubsubSection, SwarmSection,
};
