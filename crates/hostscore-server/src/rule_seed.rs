use hostscore_common::types::{AlertRule, RuleCondition, RuleKind, Severity};
use hostscore_storage::memory::InMemoryStore;

/// Built-in global rule definitions used when no rule catalog is configured.
struct RuleDef {
    id: &'static str,
    name: &'static str,
    field: &'static str,
    operator: &'static str,
    threshold: f64,
    severity: Severity,
    message: &'static str,
}

const DEFAULT_RULES: &[RuleDef] = &[
    // ---- CPU ----
    RuleDef {
        id: "seed-cpu-critical",
        name: "CPU 使用率严重告警",
        field: "cpu_usage_rate",
        operator: ">",
        threshold: 90.0,
        severity: Severity::Critical,
        message: "主机 {ip} CPU 使用率 {current_value}% 超过 {threshold_value}%",
    },
    RuleDef {
        id: "seed-cpu-warning",
        name: "CPU 使用率警告",
        field: "cpu_usage_rate",
        operator: ">",
        threshold: 80.0,
        severity: Severity::Warning,
        message: "主机 {ip} CPU 使用率 {current_value}% 超过 {threshold_value}%",
    },
    // ---- Memory ----
    RuleDef {
        id: "seed-memory-critical",
        name: "内存使用率严重告警",
        field: "memory_usage_rate",
        operator: ">",
        threshold: 95.0,
        severity: Severity::Critical,
        message: "主机 {ip} 内存使用率 {current_value}% 超过 {threshold_value}%",
    },
    RuleDef {
        id: "seed-memory-warning",
        name: "内存使用率警告",
        field: "memory_usage_rate",
        operator: ">",
        threshold: 85.0,
        severity: Severity::Warning,
        message: "主机 {ip} 内存使用率 {current_value}% 超过 {threshold_value}%",
    },
    // ---- Disk ----
    RuleDef {
        id: "seed-disk-critical",
        name: "磁盘使用率严重告警",
        field: "disk_usage_rate",
        operator: ">",
        threshold: 95.0,
        severity: Severity::Critical,
        message: "主机 {ip} 磁盘使用率 {current_value}% 超过 {threshold_value}%",
    },
    RuleDef {
        id: "seed-disk-warning",
        name: "磁盘使用率警告",
        field: "disk_usage_rate",
        operator: ">",
        threshold: 85.0,
        severity: Severity::Warning,
        message: "主机 {ip} 磁盘使用率 {current_value}% 超过 {threshold_value}%",
    },
    // ---- Swap ----
    RuleDef {
        id: "seed-swap-warning",
        name: "Swap 使用率警告",
        field: "swap_usage_rate",
        operator: ">",
        threshold: 50.0,
        severity: Severity::Warning,
        message: "",
    },
    // ---- Network ----
    RuleDef {
        id: "seed-network-info",
        name: "网络流量偏高",
        field: "network_rate",
        operator: ">=",
        threshold: 102_400.0,
        severity: Severity::Info,
        message: "",
    },
];

/// The built-in rules as catalog entries.
pub fn default_rules() -> Vec<AlertRule> {
    DEFAULT_RULES
        .iter()
        .map(|def| AlertRule {
            id: def.id.to_string(),
            name: def.name.to_string(),
            kind: RuleKind::Global,
            target_host: None,
            condition: RuleCondition {
                field: def.field.to_string(),
                operator: def.operator.to_string(),
                threshold: def.threshold,
            },
            validity: None,
            severity: def.severity,
            message_template: def.message.to_string(),
            active: true,
        })
        .collect()
}

/// Seeds the built-in rules into `store` if it has no rules yet.
pub fn init_default_rules(store: &InMemoryStore) -> anyhow::Result<usize> {
    let count = store.rules()?.len();
    if count > 0 {
        tracing::debug!(
            existing = count,
            "Alert rules already exist, skipping seed initialization"
        );
        return Ok(0);
    }

    let mut inserted = 0usize;
    for rule in default_rules() {
        let name = rule.name.clone();
        match store.insert_rule(rule) {
            Ok(()) => {
                inserted += 1;
                tracing::debug!(%name, "Seeded alert rule");
            }
            Err(e) => {
                tracing::warn!(%name, error = %e, "Failed to seed alert rule");
            }
        }
    }

    tracing::info!(
        inserted,
        total = DEFAULT_RULES.len(),
        "Default alert rules initialized"
    );
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostscore_alert::validation::validate_rule;

    #[test]
    fn default_rules_are_valid_and_unique() {
        let rules = default_rules();
        let mut ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
        for rule in &rules {
            assert_eq!(validate_rule(rule), Ok(()), "{}", rule.id);
        }
    }

    #[test]
    fn seeds_only_empty_store() {
        let store = InMemoryStore::new();
        assert_eq!(init_default_rules(&store).unwrap(), DEFAULT_RULES.len());
        assert_eq!(init_default_rules(&store).unwrap(), 0);
        assert_eq!(store.rules().unwrap().len(), DEFAULT_RULES.len());
    }
}
