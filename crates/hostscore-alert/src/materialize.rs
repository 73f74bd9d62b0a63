//! Turns a rule whose condition holds into an [`Alert`].

use crate::condition::{self, CompareOp};
use crate::derived::DerivedMetrics;
use crate::fields::field_value;
use hostscore_common::i18n::TRANSLATIONS;
use hostscore_common::types::{Alert, AlertRule, MetricSample};

/// Formats a metric value for messages. Whole numbers keep one decimal
/// (`95.0`), everything else uses the shortest exact representation.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Renders the alert message for one rule.
///
/// Substitutes `{ip}`, `{current_value}`, `{threshold_value}` (alias
/// `{threshold}`) and `{field_name}`. An empty template is replaced by the
/// localised default sentence.
pub fn render_message(
    template: &str,
    host_id: &str,
    current_value: f64,
    threshold: f64,
    field: &str,
    operator: &str,
    locale: &str,
) -> String {
    let template = if template.trim().is_empty() {
        TRANSLATIONS.get(
            locale,
            "alert.default",
            "Host {ip}: {field_name} is {current_value}, {op} threshold {threshold_value}",
        )
    } else {
        template
    };

    let op_text = operator
        .parse::<CompareOp>()
        .map(|op| TRANSLATIONS.get(locale, op.i18n_key(), op.symbol()))
        .unwrap_or(operator);

    let current = format_value(current_value);
    let threshold = format_value(threshold);
    substitute(template, |name| match name {
        "ip" => Some(host_id),
        "current_value" => Some(current.as_str()),
        "threshold_value" | "threshold" => Some(threshold.as_str()),
        "field_name" => Some(field),
        "op" => Some(op_text),
        _ => None,
    })
}

/// Replaces every `{name}` in `template` for which `lookup` has a value.
/// Substituted text is never scanned again; unknown names stay verbatim.
fn substitute<'v>(template: &str, lookup: impl Fn(&str) -> Option<&'v str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}').and_then(|close| Some((close, lookup(&after[..close])?))) {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Builds the alert for `rule` fired against `sample` with resolved `value`.
pub fn materialize(rule: &AlertRule, sample: &MetricSample, value: f64, locale: &str) -> Alert {
    let message = render_message(
        &rule.message_template,
        &sample.host_id,
        value,
        rule.condition.threshold,
        &rule.condition.field,
        &rule.condition.operator,
        locale,
    );
    Alert {
        host_id: sample.host_id.clone(),
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        rule_kind: rule.kind,
        severity: rule.severity,
        message,
        current_value: value,
        threshold: rule.condition.threshold,
        field: rule.condition.field.clone(),
        operator: rule.condition.operator.clone(),
        timestamp: sample.timestamp,
    }
}

/// Evaluates one effective rule against a sample.
///
/// Returns `None` when the field has no value for this sample (the rule is
/// skipped, not an error) or when the condition does not hold.
pub fn evaluate_rule(
    rule: &AlertRule,
    sample: &MetricSample,
    derived: &DerivedMetrics,
    locale: &str,
) -> Option<Alert> {
    let Some(value) = field_value(&rule.condition.field, sample, derived) else {
        tracing::debug!(
            rule_id = %rule.id,
            host_id = %sample.host_id,
            field = %rule.condition.field,
            "Rule skipped: field has no value"
        );
        return None;
    };

    condition::evaluate(value, &rule.condition.operator, rule.condition.threshold)
        .then(|| materialize(rule, sample, value, locale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostscore_common::types::{RuleCondition, RuleKind, Severity};

    fn cpu_rule(template: &str) -> AlertRule {
        AlertRule {
            id: "7".into(),
            name: "全局CPU使用率告警".into(),
            kind: RuleKind::Global,
            target_host: None,
            condition: RuleCondition {
                field: "cpu_usage_rate".into(),
                operator: ">".into(),
                threshold: 80.0,
            },
            validity: None,
            severity: Severity::Warning,
            message_template: template.into(),
            active: true,
        }
    }

    fn busy_sample() -> MetricSample {
        MetricSample {
            cpu_usr: Some(70.0),
            cpu_sys: Some(20.0),
            cpu_iow: Some(5.0),
            ..MetricSample::new("10.0.0.5", 1_700_000_000)
        }
    }

    #[test]
    fn substitutes_all_placeholders() {
        let msg = render_message(
            "{ip}: {field_name} {current_value}% > {threshold_value}% ({threshold})",
            "10.0.0.5",
            95.0,
            80.0,
            "cpu_usage_rate",
            ">",
            "en",
        );
        assert_eq!(msg, "10.0.0.5: cpu_usage_rate 95.0% > 80.0% (80.0)");
    }

    #[test]
    fn empty_template_uses_default_sentence() {
        let msg = render_message("", "10.0.0.5", 95.5, 80.0, "cpu_usage_rate", ">", "en");
        assert_eq!(msg, "Host 10.0.0.5: cpu_usage_rate is 95.5, above threshold 80.0");

        let msg = render_message("  ", "10.0.0.5", 95.5, 80.0, "cpu_usage_rate", ">", "zh-CN");
        assert!(msg.contains("10.0.0.5"));
        assert!(msg.contains("高于"));
    }

    #[test]
    fn substituted_text_is_not_expanded_again() {
        let msg = render_message(
            "{ip} -> {current_value}",
            "{threshold_value}",
            95.0,
            80.0,
            "cpu_usage_rate",
            ">",
            "en",
        );
        assert_eq!(msg, "{threshold_value} -> 95.0");
    }

    #[test]
    fn unknown_and_unclosed_placeholders_stay_verbatim() {
        let msg = render_message(
            "{host} {{ip}} {current_value",
            "10.0.0.5",
            95.0,
            80.0,
            "cpu_usage_rate",
            ">",
            "en",
        );
        assert_eq!(msg, "{host} {10.0.0.5} {current_value");
    }

    #[test]
    fn evaluate_rule_fires_with_sample_timestamp() {
        let sample = busy_sample();
        let derived = DerivedMetrics::from_sample(&sample);
        let alert =
            evaluate_rule(&cpu_rule("CPU {current_value}%"), &sample, &derived, "en").unwrap();

        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.current_value, 95.0);
        assert_eq!(alert.threshold, 80.0);
        assert_eq!(alert.timestamp, 1_700_000_000);
        assert_eq!(alert.rule_kind, RuleKind::Global);
        assert_eq!(alert.message, "CPU 95.0%");
    }

    #[test]
    fn evaluate_rule_skips_missing_field() {
        let sample = MetricSample::new("10.0.0.5", 1);
        let derived = DerivedMetrics::from_sample(&sample);
        assert!(evaluate_rule(&cpu_rule(""), &sample, &derived, "en").is_none());
    }

    #[test]
    fn evaluate_rule_quiet_when_condition_false() {
        let sample = busy_sample();
        let derived = DerivedMetrics::from_sample(&sample);
        let mut rule = cpu_rule("");
        rule.condition.threshold = 99.0;
        assert!(evaluate_rule(&rule, &sample, &derived, "en").is_none());
    }

    #[test]
    fn format_value_keeps_one_decimal_for_whole_numbers() {
        assert_eq!(format_value(95.0), "95.0");
        assert_eq!(format_value(66.67), "66.67");
        assert_eq!(format_value(-3.0), "-3.0");
    }
}
