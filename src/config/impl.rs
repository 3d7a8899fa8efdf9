use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to defaults when `init_config`
/// has not run yet (unit tests, benches).
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .load_full()
}

/// Initialize the global configuration from `config.toml` (or the given path)
/// layered under `SCAN__*` environment variables.
///
/// # Examples
/// ```no_run
/// use scanlinker::config::init_config;
/// init_config(None);
/// ```
pub fn init_config(path: Option<&str>) {
    init_config_with(StaticConfig::load(path));
}

/// Install an already-built configuration (tests, embedding)
///
/// Replaces the active configuration if one was installed before.
pub fn init_config_with(config: StaticConfig) {
    let config = Arc::new(config);
    CONFIG
        .get_or_init(|| ArcSwap::new(config.clone()))
        .store(config);
}
