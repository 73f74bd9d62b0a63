//! Deduction-based health scoring.
//!
//! Every dimension starts at 100 and loses a fixed number of points per
//! alert according to its severity, floored at 0. A host's total is the
//! unweighted mean of its five dimension scores.

use crate::derived::round2;
use crate::fields::Dimension;
use hostscore_common::types::{Alert, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FULL_SCORE: f64 = 100.0;

/// Points deducted for one alert of the given severity.
///
/// ```
/// use hostscore_alert::scoring::deduction_for;
/// use hostscore_common::types::Severity;
///
/// assert_eq!(deduction_for(Severity::Info), 5.0);
/// assert_eq!(deduction_for(Severity::Critical), 40.0);
/// ```
pub const fn deduction_for(severity: Severity) -> f64 {
    match severity {
        Severity::Info => 5.0,
        Severity::Warning => 10.0,
        Severity::Error => 20.0,
        Severity::Critical => 40.0,
    }
}

/// Alert counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub info: usize,
    pub warning: usize,
    pub error: usize,
    pub critical: usize,
}

impl SeverityCounts {
    pub fn record(&mut self, severity: Severity) {
        *self.slot(severity) += 1;
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
            Severity::Critical => self.critical,
        }
    }

    pub fn total(&self) -> usize {
        self.info + self.warning + self.error + self.critical
    }

    pub fn merge(&mut self, other: &SeverityCounts) {
        self.info += other.info;
        self.warning += other.warning;
        self.error += other.error;
        self.critical += other.critical;
    }

    fn slot(&mut self, severity: Severity) -> &mut usize {
        match severity {
            Severity::Info => &mut self.info,
            Severity::Warning => &mut self.warning,
            Severity::Error => &mut self.error,
            Severity::Critical => &mut self.critical,
        }
    }
}

/// One alert's contribution to a dimension score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deduction {
    pub rule_name: String,
    pub severity: Severity,
    pub message: String,
    pub current_value: f64,
    pub threshold: f64,
    pub deduction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub score: f64,
    pub alert_count: usize,
    /// Kept regardless of detail level so fleet statistics never depend on it.
    pub by_severity: SeverityCounts,
    /// Empty unless details were requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deductions: Vec<Deduction>,
}

impl DimensionScore {
    pub fn perfect(dimension: Dimension) -> Self {
        Self {
            dimension,
            score: FULL_SCORE,
            alert_count: 0,
            by_severity: SeverityCounts::default(),
            deductions: Vec::new(),
        }
    }

    /// Scores `dimension` from the alerts already classified into it.
    pub fn from_alerts<'a>(
        dimension: Dimension,
        alerts: impl IntoIterator<Item = &'a Alert>,
        include_details: bool,
    ) -> Self {
        let mut score = Self::perfect(dimension);
        let mut total_deduction = 0.0;

        for alert in alerts {
            let deduction = deduction_for(alert.severity);
            total_deduction += deduction;
            score.alert_count += 1;
            score.by_severity.record(alert.severity);

            if include_details {
                score.deductions.push(Deduction {
                    rule_name: alert.rule_name.clone(),
                    severity: alert.severity,
                    message: alert.message.clone(),
                    current_value: alert.current_value,
                    threshold: alert.threshold,
                    deduction,
                });
            }
        }

        score.score = round2((FULL_SCORE - total_deduction).max(0.0));
        score
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineScore {
    pub host_id: String,
    pub total_score: f64,
    /// Always holds all five dimensions.
    pub dimensions: BTreeMap<Dimension, DimensionScore>,
    /// The `now` instant the score was computed for.
    pub evaluated_at: i64,
}

impl MachineScore {
    /// A host without alerts: every dimension at 100.
    pub fn perfect(host_id: impl Into<String>, evaluated_at: i64) -> Self {
        Self {
            host_id: host_id.into(),
            total_score: FULL_SCORE,
            dimensions: Dimension::ALL
                .into_iter()
                .map(|d| (d, DimensionScore::perfect(d)))
                .collect(),
            evaluated_at,
        }
    }

    /// Groups `alerts` by dimension and scores each one. Alerts on fields
    /// outside every dimension do not affect the score.
    pub fn from_alerts(
        host_id: impl Into<String>,
        alerts: &[Alert],
        evaluated_at: i64,
        include_details: bool,
    ) -> Self {
        if alerts.is_empty() {
            return Self::perfect(host_id, evaluated_at);
        }

        let mut grouped: BTreeMap<Dimension, Vec<&Alert>> = BTreeMap::new();
        for alert in alerts {
            match Dimension::for_field(&alert.field) {
                Some(dimension) => grouped.entry(dimension).or_default().push(alert),
                None => tracing::debug!(
                    field = %alert.field,
                    rule_id = %alert.rule_id,
                    "Alert outside scoring dimensions"
                ),
            }
        }

        let dimensions: BTreeMap<Dimension, DimensionScore> = Dimension::ALL
            .into_iter()
            .map(|d| {
                let members = grouped.get(&d).map(Vec::as_slice).unwrap_or_default();
                (
                    d,
                    DimensionScore::from_alerts(d, members.iter().copied(), include_details),
                )
            })
            .collect();

        let sum: f64 = dimensions.values().map(|s| s.score).sum();
        Self {
            host_id: host_id.into(),
            total_score: round2(sum / Dimension::ALL.len() as f64),
            dimensions,
            evaluated_at,
        }
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimensions.get(&dimension)
    }

    /// Total alerts that counted towards the score.
    pub fn alert_count(&self) -> usize {
        self.dimensions.values().map(|d| d.alert_count).sum()
    }
}
