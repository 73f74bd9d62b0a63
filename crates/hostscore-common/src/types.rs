use serde::{Deserialize, Serialize};

/// A closed time range in epoch seconds, both bounds inclusive.
///
/// # Examples
///
/// ```
/// use hostscore_common::types::TimeWindow;
///
/// let window = TimeWindow::new(100, 200);
/// assert!(window.contains(100));
/// assert!(window.contains(200));
/// assert!(!window.contains(201));
/// assert_eq!(TimeWindow::ending_at(500, 60), TimeWindow::new(440, 500));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// The `secs`-long window that ends at `end`.
    pub fn ending_at(end: i64, secs: u64) -> Self {
        Self {
            start: end.saturating_sub(secs as i64),
            end,
        }
    }

    pub fn contains(&self, ts: i64) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// One telemetry reading reported by a host.
///
/// Every counter is optional: collectors on different platforms report
/// different subsets, and a missing counter must stay distinguishable from
/// a zero reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub host_id: String,
    pub timestamp: i64,

    #[serde(default)]
    pub cpu_usr: Option<f64>,
    #[serde(default)]
    pub cpu_sys: Option<f64>,
    #[serde(default)]
    pub cpu_iow: Option<f64>,

    #[serde(default)]
    pub mem_total: Option<i64>,
    #[serde(default)]
    pub mem_free: Option<i64>,
    #[serde(default)]
    pub mem_buff: Option<i64>,
    #[serde(default)]
    pub mem_cache: Option<i64>,

    #[serde(default)]
    pub swap_total: Option<i64>,
    #[serde(default)]
    pub swap_used: Option<i64>,
    #[serde(default)]
    pub swap_in: Option<i64>,
    #[serde(default)]
    pub swap_out: Option<i64>,

    #[serde(default)]
    pub system_in: Option<i64>,
    #[serde(default)]
    pub system_cs: Option<i64>,

    #[serde(default)]
    pub disk_name: Option<String>,
    #[serde(default)]
    pub disk_total: Option<i64>,
    #[serde(default)]
    pub disk_used: Option<i64>,
    #[serde(default)]
    pub disk_used_percent: Option<f64>,
    #[serde(default)]
    pub disk_iops: Option<i64>,
    #[serde(default)]
    pub disk_r: Option<i64>,
    #[serde(default)]
    pub disk_w: Option<i64>,

    #[serde(default)]
    pub net_rx_kbytes: Option<f64>,
    #[serde(default)]
    pub net_tx_kbytes: Option<f64>,
    #[serde(default)]
    pub net_rx_kbps: Option<f64>,
    #[serde(default)]
    pub net_tx_kbps: Option<f64>,

    #[serde(default)]
    pub version: Option<String>,
}

impl MetricSample {
    /// An empty sample for `host_id` at `timestamp`; counters are filled in
    /// with struct update syntax.
    pub fn new(host_id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            host_id: host_id.into(),
            timestamp,
            ..Default::default()
        }
    }
}

/// Alert severity level, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use hostscore_common::types::Severity;
///
/// let sev: Severity = "error".parse().unwrap();
/// assert_eq!(sev, Severity::Error);
/// assert_eq!(sev.to_string(), "error");
/// assert!(Severity::Critical > Severity::Warning);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// Whether a rule applies fleet-wide or to a single host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Global,
    Specific,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::Global => write!(f, "global"),
            RuleKind::Specific => write!(f, "specific"),
        }
    }
}

impl std::str::FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global" => Ok(RuleKind::Global),
            "specific" => Ok(RuleKind::Specific),
            _ => Err(format!("unknown rule kind: {s}")),
        }
    }
}

/// `field <operator> threshold`, as stored by the rule repository.
///
/// The operator is kept as the raw symbol (`>`, `<`, `>=`, `<=`, `==`, `!=`);
/// it is parsed at evaluation time so that a malformed stored rule never
/// aborts an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub field: String,
    pub operator: String,
    pub threshold: f64,
}

/// Optional validity period of a rule. A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub end: Option<i64>,
}

impl ValidityWindow {
    /// Returns true when `now` lies within every bound that is set.
    ///
    /// ```
    /// use hostscore_common::types::ValidityWindow;
    ///
    /// let w = ValidityWindow { start: Some(10), end: None };
    /// assert!(!w.is_valid_at(9));
    /// assert!(w.is_valid_at(10));
    /// assert!(w.is_valid_at(i64::MAX));
    /// ```
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.start.map_or(true, |start| start <= now) && self.end.map_or(true, |end| now <= end)
    }
}

/// An alert rule definition as delivered by the rule repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    pub kind: RuleKind,
    /// Required for [`RuleKind::Specific`], absent for [`RuleKind::Global`].
    #[serde(default)]
    pub target_host: Option<String>,
    pub condition: RuleCondition,
    #[serde(default)]
    pub validity: Option<ValidityWindow>,
    #[serde(default)]
    pub severity: Severity,
    /// May reference `{ip}`, `{current_value}`, `{threshold_value}` and `{field_name}`.
    #[serde(default)]
    pub message_template: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl AlertRule {
    /// Returns true when the rule has no validity window or `now` lies inside it.
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.validity.map_or(true, |w| w.is_valid_at(now))
    }
}

/// A fired alert. Produced fresh on every evaluation and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub host_id: String,
    pub rule_id: String,
    pub rule_name: String,
    pub rule_kind: RuleKind,
    pub severity: Severity,
    pub message: String,
    pub current_value: f64,
    pub threshold: f64,
    pub field: String,
    pub operator: String,
    /// Timestamp of the sample the alert was evaluated against.
    pub timestamp: i64,
}
