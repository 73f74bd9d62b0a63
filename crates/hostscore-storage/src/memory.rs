use crate::error::{Result, StorageError};
use crate::{MetricStore, RuleStore};
use hostscore_common::types::{AlertRule, MetricSample, RuleKind, TimeWindow};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Rule seed file layout: `{"rules": [ ... ]}`.
#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: Vec<AlertRule>,
}

/// Reads a JSON array of [`MetricSample`]s.
pub fn load_samples(path: &Path) -> Result<Vec<MetricSample>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Reads a rule seed file of the form `{"rules": [...]}`.
pub fn load_rules(path: &Path) -> Result<Vec<AlertRule>> {
    let content = std::fs::read_to_string(path)?;
    let file: RulesFile = serde_json::from_str(&content)?;
    Ok(file.rules)
}

/// Checks the kind/target pairing every stored rule must satisfy.
fn check_target(rule: &AlertRule) -> Result<()> {
    let has_target = rule.target_host.as_deref().is_some_and(|t| !t.trim().is_empty());
    match (rule.kind, has_target) {
        (RuleKind::Specific, false) => Err(StorageError::RejectedRule {
            id: rule.id.clone(),
            reason: "specific rule requires a target host".to_string(),
        }),
        (RuleKind::Global, true) => Err(StorageError::RejectedRule {
            id: rule.id.clone(),
            reason: "global rule must not name a target host".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Thread-safe in-memory telemetry and rule store.
///
/// Samples are kept per host in arrival order; rules in insertion order.
#[derive(Default)]
pub struct InMemoryStore {
    samples: RwLock<HashMap<String, Vec<MetricSample>>>,
    rules: RwLock<Vec<AlertRule>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a samples file and an optional rules file.
    pub fn from_files(samples_path: &Path, rules_path: Option<&Path>) -> Result<Self> {
        let store = Self::new();
        let samples = load_samples(samples_path)?;
        let count = samples.len();
        store.insert_samples(samples)?;
        tracing::info!(count, path = %samples_path.display(), "Loaded metric samples");

        if let Some(rules_path) = rules_path {
            let rules = load_rules(rules_path)?;
            let count = rules.len();
            for rule in rules {
                store.insert_rule(rule)?;
            }
            tracing::info!(count, path = %rules_path.display(), "Loaded alert rules");
        }
        Ok(store)
    }

    fn read_samples(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Vec<MetricSample>>>> {
        self.samples.read().map_err(|_| poisoned("metrics"))
    }

    fn write_samples(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<MetricSample>>>> {
        self.samples.write().map_err(|_| poisoned("metrics"))
    }

    fn read_rules(&self) -> Result<RwLockReadGuard<'_, Vec<AlertRule>>> {
        self.rules.read().map_err(|_| poisoned("rules"))
    }

    fn write_rules(&self) -> Result<RwLockWriteGuard<'_, Vec<AlertRule>>> {
        self.rules.write().map_err(|_| poisoned("rules"))
    }

    pub fn insert_sample(&self, sample: MetricSample) -> Result<()> {
        self.write_samples()?
            .entry(sample.host_id.clone())
            .or_default()
            .push(sample);
        Ok(())
    }

    pub fn insert_samples(&self, samples: impl IntoIterator<Item = MetricSample>) -> Result<()> {
        let mut map = self.write_samples()?;
        for sample in samples {
            map.entry(sample.host_id.clone()).or_default().push(sample);
        }
        Ok(())
    }

    /// Adds a rule, replacing any rule with the same id in place.
    ///
    /// Rejects a specific rule without a target and a global rule with one.
    pub fn insert_rule(&self, rule: AlertRule) -> Result<()> {
        check_target(&rule)?;
        let mut rules = self.write_rules()?;
        match rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
        Ok(())
    }

    /// Removes a rule by id. Returns true if found and removed.
    pub fn remove_rule(&self, id: &str) -> Result<bool> {
        let mut rules = self.write_rules()?;
        let len_before = rules.len();
        rules.retain(|r| r.id != id);
        Ok(rules.len() < len_before)
    }

    /// Enables or disables a rule without removing it.
    pub fn set_rule_active(&self, id: &str, active: bool) -> Result<()> {
        let mut rules = self.write_rules()?;
        let rule = rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StorageError::NotFound {
                entity: "alert_rule",
                id: id.to_string(),
            })?;
        rule.active = active;
        Ok(())
    }

    /// Snapshot of every stored rule, active or not.
    pub fn rules(&self) -> Result<Vec<AlertRule>> {
        Ok(self.read_rules()?.clone())
    }
}

fn poisoned(store: &'static str) -> StorageError {
    StorageError::Unavailable {
        store,
        reason: "lock poisoned".to_string(),
    }
}

impl MetricStore for InMemoryStore {
    fn latest_sample(&self, host_id: &str, window: TimeWindow) -> Result<Option<MetricSample>> {
        let samples = self.read_samples()?;
        // Ties on timestamp go to the later arrival.
        let latest = samples.get(host_id).and_then(|series| {
            series
                .iter()
                .filter(|s| window.contains(s.timestamp))
                .max_by_key(|s| s.timestamp)
        });
        Ok(latest.cloned())
    }

    fn active_hosts(&self, window: TimeWindow) -> Result<BTreeSet<String>> {
        let samples = self.read_samples()?;
        Ok(samples
            .iter()
            .filter(|(_, series)| series.iter().any(|s| window.contains(s.timestamp)))
            .map(|(host, _)| host.clone())
            .collect())
    }
}

impl RuleStore for InMemoryStore {
    fn active_rules(&self, kind: RuleKind, target_host: Option<&str>) -> Result<Vec<AlertRule>> {
        let rules = self.read_rules()?;
        Ok(rules
            .iter()
            .filter(|r| r.active && r.kind == kind)
            .filter(|r| match kind {
                RuleKind::Global => true,
                RuleKind::Specific => r.target_host.as_deref() == target_host,
            })
            .cloned()
            .collect())
    }
}
