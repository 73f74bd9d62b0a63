pub mod config;
pub mod fleet;
pub mod rule_seed;

use hostscore_alert::validation::validate_rule;
use hostscore_alert::HealthEngine;
use hostscore_storage::memory::InMemoryStore;
use std::path::Path;
use std::sync::Arc;

/// Loads the configured samples and rules into one in-memory store.
///
/// Without a rules file the built-in defaults are seeded. Rules that fail
/// validation are reported and kept: the engine never fires them.
pub fn load_store(config: &config::ServerConfig) -> anyhow::Result<Arc<InMemoryStore>> {
    let store = InMemoryStore::from_files(
        Path::new(&config.samples_path),
        config.rules_path.as_deref().map(Path::new),
    )?;

    if config.rules_path.is_none() {
        rule_seed::init_default_rules(&store)?;
    }

    for rule in store.rules()? {
        if let Err(e) = validate_rule(&rule) {
            tracing::warn!(rule_id = %rule.id, error = %e, "Invalid alert rule");
        }
    }

    Ok(Arc::new(store))
}

/// Builds the scoring engine over `store` with the configured locale.
pub fn build_engine(config: &config::ServerConfig, store: Arc<InMemoryStore>) -> HealthEngine {
    HealthEngine::new(store.clone(), store).with_locale(config.locale.clone())
}
