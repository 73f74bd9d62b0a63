//! Selection of the effective rule set for one host.
//!
//! A host is evaluated against every currently valid global rule plus every
//! currently valid specific rule targeting it. A specific rule overrides a
//! global rule only when severity, field and operator all match; a
//! different severity on the same field/operator leaves both in force.

use hostscore_common::types::{AlertRule, Severity};
use std::collections::HashMap;

/// `(severity, condition field, operator)`.
type OverrideKey<'a> = (Severity, &'a str, &'a str);

fn override_key(rule: &AlertRule) -> OverrideKey<'_> {
    (
        rule.severity,
        rule.condition.field.as_str(),
        rule.condition.operator.as_str(),
    )
}

/// Returns the rules to evaluate for one host at instant `now`.
///
/// `globals` and `specifics` are the active rules of each kind as delivered
/// by the rule store, the latter already restricted to the host. Surviving
/// globals come first, then the valid specifics, each in input order.
pub fn resolve_effective_rules(
    globals: Vec<AlertRule>,
    specifics: Vec<AlertRule>,
    now: i64,
) -> Vec<AlertRule> {
    let specifics: Vec<AlertRule> = specifics
        .into_iter()
        .filter(|r| r.is_valid_at(now))
        .collect();

    // Later duplicates overwrite earlier ones; only the key set decides
    // suppression, the stored id is kept for logging.
    let overrides: HashMap<OverrideKey<'_>, &str> = specifics
        .iter()
        .map(|r| (override_key(r), r.id.as_str()))
        .collect();

    let mut effective: Vec<AlertRule> = globals
        .into_iter()
        .filter(|r| r.is_valid_at(now))
        .filter(|global| match overrides.get(&override_key(global)) {
            Some(specific_id) => {
                tracing::debug!(
                    global_rule = %global.id,
                    specific_rule = %specific_id,
                    "Global rule overridden"
                );
                false
            }
            None => true,
        })
        .collect();

    effective.extend(specifics.iter().cloned());
    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostscore_common::types::{RuleCondition, RuleKind, ValidityWindow};

    fn make_rule(id: &str, kind: RuleKind, severity: Severity, field: &str, op: &str) -> AlertRule {
        AlertRule {
            id: id.into(),
            name: id.into(),
            kind,
            target_host: (kind == RuleKind::Specific).then(|| "10.0.0.5".to_string()),
            condition: RuleCondition {
                field: field.into(),
                operator: op.into(),
                threshold: 80.0,
            },
            validity: None,
            severity,
            message_template: String::new(),
            active: true,
        }
    }

    fn global(id: &str, severity: Severity, field: &str, op: &str) -> AlertRule {
        make_rule(id, RuleKind::Global, severity, field, op)
    }

    fn specific(id: &str, severity: Severity, field: &str, op: &str) -> AlertRule {
        make_rule(id, RuleKind::Specific, severity, field, op)
    }

    fn ids(rules: &[AlertRule]) -> Vec<&str> {
        rules.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn specific_overrides_global_with_same_triple() {
        let globals = vec![global("g1", Severity::Warning, "cpu_usage_rate", ">")];
        let specifics = vec![specific("s1", Severity::Warning, "cpu_usage_rate", ">")];

        let effective = resolve_effective_rules(globals, specifics, 0);
        assert_eq!(ids(&effective), vec!["s1"]);
    }

    #[test]
    fn different_severity_does_not_override() {
        let globals = vec![global("g1", Severity::Warning, "cpu_usage_rate", ">")];
        let specifics = vec![specific("s1", Severity::Critical, "cpu_usage_rate", ">")];

        let effective = resolve_effective_rules(globals, specifics, 0);
        assert_eq!(ids(&effective), vec!["g1", "s1"]);
    }

    #[test]
    fn different_operator_or_field_does_not_override() {
        let globals = vec![
            global("g1", Severity::Warning, "cpu_usage_rate", ">"),
            global("g2", Severity::Warning, "memory_usage_rate", ">"),
        ];
        let specifics = vec![specific("s1", Severity::Warning, "cpu_usage_rate", ">=")];

        let effective = resolve_effective_rules(globals, specifics, 0);
        assert_eq!(ids(&effective), vec!["g1", "g2", "s1"]);
    }

    #[test]
    fn expired_specific_does_not_override() {
        let globals = vec![global("g1", Severity::Warning, "cpu_usage_rate", ">")];
        let mut expired = specific("s1", Severity::Warning, "cpu_usage_rate", ">");
        expired.validity = Some(ValidityWindow {
            start: None,
            end: Some(100),
        });

        let effective = resolve_effective_rules(globals, vec![expired], 101);
        assert_eq!(ids(&effective), vec!["g1"]);
    }

    #[test]
    fn global_outside_validity_is_dropped() {
        let mut late = global("g1", Severity::Info, "disk_usage_rate", ">");
        late.validity = Some(ValidityWindow {
            start: Some(500),
            end: None,
        });

        assert!(resolve_effective_rules(vec![late.clone()], vec![], 499).is_empty());
        assert_eq!(ids(&resolve_effective_rules(vec![late], vec![], 500)), vec!["g1"]);
    }

    #[test]
    fn duplicate_specific_keys_all_stay_effective() {
        let globals = vec![global("g1", Severity::Warning, "cpu_usage_rate", ">")];
        let specifics = vec![
            specific("s1", Severity::Warning, "cpu_usage_rate", ">"),
            specific("s2", Severity::Warning, "cpu_usage_rate", ">"),
        ];

        let effective = resolve_effective_rules(globals, specifics, 0);
        assert_eq!(ids(&effective), vec!["s1", "s2"]);
    }

    #[test]
    fn no_rules_is_empty_not_error() {
        assert!(resolve_effective_rules(vec![], vec![], 0).is_empty());
    }
}
