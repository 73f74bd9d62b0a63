use crate::derived::DerivedMetrics;
use crate::error::Result;
use crate::materialize::evaluate_rule;
use crate::resolver::resolve_effective_rules;
use crate::scoring::MachineScore;
use crate::summary::FleetSummary;
use hostscore_common::i18n::DEFAULT_LOCALE;
use hostscore_common::types::{Alert, AlertRule, MetricSample, RuleKind, Severity, TimeWindow};
use hostscore_storage::{MetricStore, RuleStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Scores of a set of hosts plus their summary.
#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub scores: Vec<MachineScore>,
    pub summary: FleetSummary,
}

/// Restricts [`HealthEngine::list_alerts`]. Empty lists mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertFilter {
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub severities: Vec<Severity>,
    #[serde(default)]
    pub kinds: Vec<RuleKind>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        (self.severities.is_empty() || self.severities.contains(&alert.severity))
            && (self.kinds.is_empty() || self.kinds.contains(&alert.rule_kind))
    }
}

/// Latest derived metrics for one host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostOverview {
    pub host_id: String,
    pub latest_timestamp: i64,
    pub metrics: DerivedMetrics,
}

/// Evaluates hosts against the rule catalog and scores them.
///
/// The engine holds no mutable state; every call reads the stores afresh,
/// so one instance can be cloned into worker tasks freely.
#[derive(Clone)]
pub struct HealthEngine {
    metrics: Arc<dyn MetricStore>,
    rules: Arc<dyn RuleStore>,
    locale: String,
}

impl HealthEngine {
    pub fn new(metrics: Arc<dyn MetricStore>, rules: Arc<dyn RuleStore>) -> Self {
        Self {
            metrics,
            rules,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }

    /// Sets the locale used for default alert messages.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// The rules in force for `host_id` at `now`.
    pub fn effective_rules(&self, host_id: &str, now: i64) -> Result<Vec<AlertRule>> {
        let globals = self.rules.active_rules(RuleKind::Global, None)?;
        let specifics = self.rules.active_rules(RuleKind::Specific, Some(host_id))?;
        Ok(resolve_effective_rules(globals, specifics, now))
    }

    /// All alerts for the host's latest sample in `window`.
    ///
    /// A host without a sample in the window yields no alerts. A failing
    /// store is an error, never an empty list.
    pub fn evaluate_host(&self, host_id: &str, window: TimeWindow, now: i64) -> Result<Vec<Alert>> {
        let Some(sample) = self.metrics.latest_sample(host_id, window)? else {
            tracing::debug!(host_id, "No sample in window");
            return Ok(Vec::new());
        };

        let rules = self.effective_rules(host_id, now)?;
        Ok(self.evaluate_sample(&sample, &rules))
    }

    fn evaluate_sample(&self, sample: &MetricSample, rules: &[AlertRule]) -> Vec<Alert> {
        let derived = DerivedMetrics::from_sample(sample);
        let alerts: Vec<Alert> = rules
            .iter()
            .filter_map(|rule| evaluate_rule(rule, sample, &derived, &self.locale))
            .collect();

        if !alerts.is_empty() {
            tracing::debug!(
                host_id = %sample.host_id,
                rules = rules.len(),
                alerts = alerts.len(),
                "Host evaluated"
            );
        }
        alerts
    }

    pub fn score_host(
        &self,
        host_id: &str,
        window: TimeWindow,
        now: i64,
        include_details: bool,
    ) -> Result<MachineScore> {
        let alerts = self.evaluate_host(host_id, window, now)?;
        Ok(MachineScore::from_alerts(host_id, &alerts, now, include_details))
    }

    /// Hosts active in `window`, narrowed to `host_ids` when given.
    ///
    /// Requested hosts that did not report are dropped rather than scored
    /// as perfect.
    pub fn target_hosts(
        &self,
        host_ids: Option<&[String]>,
        window: TimeWindow,
    ) -> Result<Vec<String>> {
        let active = self.metrics.active_hosts(window)?;
        let hosts = match host_ids {
            Some(requested) => {
                let requested: BTreeSet<&str> = requested.iter().map(String::as_str).collect();
                active
                    .into_iter()
                    .filter(|h| requested.contains(h.as_str()))
                    .collect()
            }
            None => active.into_iter().collect(),
        };
        Ok(hosts)
    }

    /// Scores every target host sequentially and summarises the result.
    ///
    /// Any store failure fails the whole call; a partial fleet would skew
    /// the averages.
    pub fn score_fleet(
        &self,
        host_ids: Option<&[String]>,
        window: TimeWindow,
        now: i64,
        include_details: bool,
    ) -> Result<FleetReport> {
        let hosts = self.target_hosts(host_ids, window)?;
        let scores = hosts
            .iter()
            .map(|host| self.score_host(host, window, now, include_details))
            .collect::<Result<Vec<_>>>()?;

        let summary = FleetSummary::from_scores(&scores);
        tracing::debug!(
            hosts = summary.total_hosts,
            average = summary.average_score,
            "Fleet scored"
        );
        Ok(FleetReport { scores, summary })
    }

    /// Alerts across the active hosts of `window` that pass `filter`,
    /// grouped by host in host order.
    pub fn list_alerts(
        &self,
        filter: &AlertFilter,
        window: TimeWindow,
        now: i64,
    ) -> Result<Vec<Alert>> {
        let requested = (!filter.hosts.is_empty()).then_some(filter.hosts.as_slice());
        let mut alerts = Vec::new();
        for host in self.target_hosts(requested, window)? {
            alerts.extend(
                self.evaluate_host(&host, window, now)?
                    .into_iter()
                    .filter(|a| filter.matches(a)),
            );
        }
        Ok(alerts)
    }

    /// Latest sample timestamp and derived metrics per active host.
    pub fn host_overview(&self, window: TimeWindow) -> Result<Vec<HostOverview>> {
        let mut overview = Vec::new();
        for host in self.metrics.active_hosts(window)? {
            // A host can age out between the two reads.
            let Some(sample) = self.metrics.latest_sample(&host, window)? else {
                continue;
            };
            overview.push(HostOverview {
                metrics: DerivedMetrics::from_sample(&sample),
                latest_timestamp: sample.timestamp,
                host_id: host,
            });
        }
        Ok(overview)
    }
}
