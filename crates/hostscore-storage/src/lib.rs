//! Collaborator interfaces consumed by the scoring engine.
//!
//! The engine never owns telemetry or rules: it reads the latest sample per
//! host through a [`MetricStore`] and the active rule catalog through a
//! [`RuleStore`]. [`memory::InMemoryStore`] implements both and can be
//! seeded from JSON files.

pub mod error;
pub mod memory;


use error::Result;
use hostscore_common::types::{AlertRule, MetricSample, RuleKind, TimeWindow};
use std::collections::BTreeSet;

/// Read access to recorded telemetry.
///
/// Implementations must be safe to share across threads (`Send + Sync`)
/// because fleet scoring evaluates hosts concurrently.
pub trait MetricStore: Send + Sync {
    /// Returns the most recent sample for `host_id` whose timestamp lies in
    /// `window`, or `None` when the host did not report in it.
    fn latest_sample(&self, host_id: &str, window: TimeWindow) -> Result<Option<MetricSample>>;

    /// Returns the distinct hosts that reported at least once in `window`.
    fn active_hosts(&self, window: TimeWindow) -> Result<BTreeSet<String>>;
}

/// Read access to the alert rule catalog.
pub trait RuleStore: Send + Sync {
    /// Returns the active rules of `kind`. For [`RuleKind::Specific`] only
    /// rules whose target equals `target_host` are returned; `target_host`
    /// is ignored for global rules.
    ///
    /// Rules are returned in catalog order.
    fn active_rules(&self, kind: RuleKind, target_host: Option<&str>) -> Result<Vec<AlertRule>>;
}
