use crate::condition::CompareOp;
use crate::error::RuleError;
use crate::fields::field_spec;
use hostscore_common::types::{AlertRule, RuleKind};

/// Checks a rule definition before it enters the catalog.
///
/// The evaluator tolerates malformed rules (they simply never fire); this
/// check is what the administrative side runs on create and update.
pub fn validate_rule(rule: &AlertRule) -> Result<(), RuleError> {
    if rule.name.trim().is_empty() {
        return Err(RuleError::EmptyName);
    }

    let has_target = rule.target_host.as_deref().is_some_and(|t| !t.trim().is_empty());
    match rule.kind {
        RuleKind::Specific if !has_target => return Err(RuleError::MissingTarget),
        RuleKind::Global if has_target => return Err(RuleError::UnexpectedTarget),
        _ => {}
    }

    if rule.condition.operator.parse::<CompareOp>().is_err() {
        return Err(RuleError::UnknownOperator(rule.condition.operator.clone()));
    }
    if field_spec(&rule.condition.field).is_none() {
        return Err(RuleError::UnknownField(rule.condition.field.clone()));
    }
    if !rule.condition.threshold.is_finite() {
        return Err(RuleError::NonFiniteThreshold);
    }

    if let Some(window) = rule.validity {
        if let (Some(start), Some(end)) = (window.start, window.end) {
            if start > end {
                return Err(RuleError::InvertedValidity { start, end });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostscore_common::types::{RuleCondition, Severity, ValidityWindow};

    fn global_rule() -> AlertRule {
        AlertRule {
            id: "1".into(),
            name: "CPU 使用率过高".into(),
            kind: RuleKind::Global,
            target_host: None,
            condition: RuleCondition {
                field: "cpu_usage_rate".into(),
                operator: ">".into(),
                threshold: 80.0,
            },
            validity: None,
            severity: Severity::Warning,
            message_template: String::new(),
            active: true,
        }
    }

    #[test]
    fn accepts_well_formed_rules() {
        assert_eq!(validate_rule(&global_rule()), Ok(()));

        let mut specific = global_rule();
        specific.kind = RuleKind::Specific;
        specific.target_host = Some("10.0.0.5".into());
        specific.validity = Some(ValidityWindow {
            start: Some(10),
            end: Some(10),
        });
        assert_eq!(validate_rule(&specific), Ok(()));
    }

    #[test]
    fn rejects_target_mismatch() {
        let mut rule = global_rule();
        rule.target_host = Some("10.0.0.5".into());
        assert_eq!(validate_rule(&rule), Err(RuleError::UnexpectedTarget));

        let mut rule = global_rule();
        rule.kind = RuleKind::Specific;
        assert_eq!(validate_rule(&rule), Err(RuleError::MissingTarget));

        rule.target_host = Some("  ".into());
        assert_eq!(validate_rule(&rule), Err(RuleError::MissingTarget));
    }

    #[test]
    fn rejects_bad_condition() {
        let mut rule = global_rule();
        rule.condition.operator = "=>".into();
        assert_eq!(validate_rule(&rule), Err(RuleError::UnknownOperator("=>".into())));

        let mut rule = global_rule();
        rule.condition.field = "gpu_usage".into();
        assert_eq!(validate_rule(&rule), Err(RuleError::UnknownField("gpu_usage".into())));

        let mut rule = global_rule();
        rule.condition.threshold = f64::NAN;
        assert_eq!(validate_rule(&rule), Err(RuleError::NonFiniteThreshold));
    }

    #[test]
    fn rejects_inverted_window_and_empty_name() {
        let mut rule = global_rule();
        rule.validity = Some(ValidityWindow {
            start: Some(20),
            end: Some(10),
        });
        assert_eq!(
            validate_rule(&rule),
            Err(RuleError::InvertedValidity { start: 20, end: 10 })
        );

        let mut rule = global_rule();
        rule.name = " ".into();
        assert_eq!(validate_rule(&rule), Err(RuleError::EmptyName));
    }
}
