//! Overlay of profile defaults onto a loaded config document.

use super::profile::NodeDefaults;
use super::schema::NodeConfig;

/// Apply a profile's default fields to `config`.
///
/// Touches only the managed fields; `Identity` and every flattened foreign
/// section pass through untouched, so re-applying the same defaults to an
/// already-patched config is a no-op.
pub fn apply_defaults(config: &mut NodeConfig, defaults: &NodeDefaults) {
    config.bootstrap = defaults.bootstrap.clone();
    config.swarm.conn_mgr.low_water = Some(defaults.conn_mgr.low_water);
    config.swarm.conn_mgr.high_water = Some(defaults.conn_mgr.high_water);
    config.swarm.conn_mgr.grace_period = defaults.conn_mgr.grace_period.clone();
    config.pubsub.router = Some(defaults.pubsub_router.clone());
    config.discovery.mdns.enabled = defaults.mdns;
    config.api.http_headers = defaults.api_headers.clone();
    config.preload.enabled = defaults.preload;
}
