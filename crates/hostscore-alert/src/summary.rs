//! Fleet-level statistics over already computed [`MachineScore`]s.
//!
//! Nothing here touches a store or re-resolves rules: the summary is a
//! reduction, and [`SummaryAccumulator`] can be filled in parallel chunks
//! and merged in any grouping.

use crate::derived::round2;
use crate::fields::Dimension;
use crate::scoring::{MachineScore, SeverityCounts};
use serde::Serialize;
use std::collections::BTreeMap;

/// Histogram buckets as `(label, inclusive lower bound)`, highest first.
pub const SCORE_BUCKETS: [(&str, f64); 6] = [
    ("90-100", 90.0),
    ("80-89", 80.0),
    ("70-79", 70.0),
    ("60-69", 60.0),
    ("50-59", 50.0),
    ("0-49", f64::NEG_INFINITY),
];

/// Index into [`SCORE_BUCKETS`] for a total score.
pub fn bucket_index(score: f64) -> usize {
    SCORE_BUCKETS
        .iter()
        .position(|(_, lower)| score >= *lower)
        .unwrap_or(SCORE_BUCKETS.len() - 1)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub range: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertDistribution {
    pub total_alerts: usize,
    pub by_severity: SeverityCounts,
    pub by_dimension: BTreeMap<Dimension, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSummary {
    pub total_hosts: usize,
    pub average_score: f64,
    pub dimension_averages: BTreeMap<Dimension, f64>,
    pub score_distribution: Vec<BucketCount>,
    pub alert_distribution: AlertDistribution,
}

impl FleetSummary {
    pub fn from_scores(scores: &[MachineScore]) -> Self {
        scores
            .iter()
            .fold(SummaryAccumulator::default(), |mut acc, score| {
                acc.add(score);
                acc
            })
            .finish()
    }

    pub fn bucket(&self, range: &str) -> Option<usize> {
        self.score_distribution
            .iter()
            .find(|b| b.range == range)
            .map(|b| b.count)
    }
}

/// Running sums behind a [`FleetSummary`].
#[derive(Debug, Clone, Default)]
pub struct SummaryAccumulator {
    hosts: usize,
    total_score_sum: f64,
    dimension_sums: BTreeMap<Dimension, f64>,
    buckets: [usize; SCORE_BUCKETS.len()],
    alerts: AlertDistribution,
}

impl SummaryAccumulator {
    pub fn add(&mut self, score: &MachineScore) {
        self.hosts += 1;
        self.total_score_sum += score.total_score;
        self.buckets[bucket_index(score.total_score)] += 1;

        // Every dimension is listed once a host has been seen, quiet ones at 0.
        for dimension in Dimension::ALL {
            self.alerts.by_dimension.entry(dimension).or_default();
        }
        for (dimension, dim_score) in &score.dimensions {
            *self.dimension_sums.entry(*dimension).or_default() += dim_score.score;
            *self.alerts.by_dimension.entry(*dimension).or_default() += dim_score.alert_count;
            self.alerts.total_alerts += dim_score.alert_count;
            self.alerts.by_severity.merge(&dim_score.by_severity);
        }
    }

    pub fn merge(&mut self, other: SummaryAccumulator) {
        self.hosts += other.hosts;
        self.total_score_sum += other.total_score_sum;
        for (dimension, sum) in other.dimension_sums {
            *self.dimension_sums.entry(dimension).or_default() += sum;
        }
        for (mine, theirs) in self.buckets.iter_mut().zip(other.buckets) {
            *mine += theirs;
        }
        self.alerts.total_alerts += other.alerts.total_alerts;
        self.alerts.by_severity.merge(&other.alerts.by_severity);
        for (dimension, count) in other.alerts.by_dimension {
            *self.alerts.by_dimension.entry(dimension).or_default() += count;
        }
    }

    pub fn finish(self) -> FleetSummary {
        let hosts = self.hosts;
        let mean = |sum: f64| {
            if hosts == 0 {
                0.0
            } else {
                round2(sum / hosts as f64)
            }
        };

        FleetSummary {
            total_hosts: hosts,
            average_score: mean(self.total_score_sum),
            dimension_averages: self
                .dimension_sums
                .into_iter()
                .map(|(d, sum)| (d, mean(sum)))
                .collect(),
            score_distribution: SCORE_BUCKETS
                .iter()
                .zip(self.buckets)
                .map(|(&(range, _), count)| BucketCount { range, count })
                .collect(),
            alert_distribution: self.alerts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::DimensionScore;
    use hostscore_common::types::Severity;

    fn score_with(host: &str, cpu: f64, warnings: usize) -> MachineScore {
        let mut score = MachineScore::perfect(host, 0);
        let dim = score.dimensions.get_mut(&Dimension::Cpu).unwrap();
        *dim = DimensionScore {
            score: cpu,
            alert_count: warnings,
            by_severity: SeverityCounts {
                warning: warnings,
                ..Default::default()
            },
            ..DimensionScore::perfect(Dimension::Cpu)
        };
        score.total_score = round2((cpu + 400.0) / 5.0);
        score
    }

    #[test]
    fn bucket_boundaries_use_lower_bound() {
        assert_eq!(SCORE_BUCKETS[bucket_index(100.0)].0, "90-100");
        assert_eq!(SCORE_BUCKETS[bucket_index(90.0)].0, "90-100");
        assert_eq!(SCORE_BUCKETS[bucket_index(89.99)].0, "80-89");
        assert_eq!(SCORE_BUCKETS[bucket_index(50.0)].0, "50-59");
        assert_eq!(SCORE_BUCKETS[bucket_index(49.99)].0, "0-49");
        assert_eq!(SCORE_BUCKETS[bucket_index(0.0)].0, "0-49");
    }

    #[test]
    fn empty_fleet_summary() {
        let summary = FleetSummary::from_scores(&[]);
        assert_eq!(summary.total_hosts, 0);
        assert_eq!(summary.average_score, 0.0);
        assert!(summary.dimension_averages.is_empty());
        assert_eq!(summary.score_distribution.len(), 6);
        assert!(summary.score_distribution.iter().all(|b| b.count == 0));
        assert_eq!(summary.alert_distribution, AlertDistribution::default());
    }

    #[test]
    fn averages_and_histogram() {
        let scores = vec![
            MachineScore::perfect("a", 0),
            score_with("b", 90.0, 1),
            score_with("c", 0.0, 10),
        ];
        let summary = FleetSummary::from_scores(&scores);

        assert_eq!(summary.total_hosts, 3);
        assert_eq!(summary.average_score, round2((100.0 + 98.0 + 80.0) / 3.0));
        assert_eq!(summary.dimension_averages[&Dimension::Cpu], round2(190.0 / 3.0));
        assert_eq!(summary.dimension_averages[&Dimension::Swap], 100.0);
        assert_eq!(summary.bucket("90-100"), Some(2));
        assert_eq!(summary.bucket("80-89"), Some(1));
        let counted: usize = summary.score_distribution.iter().map(|b| b.count).sum();
        assert_eq!(counted, scores.len());

        let alerts = &summary.alert_distribution;
        assert_eq!(alerts.total_alerts, 11);
        assert_eq!(alerts.by_severity.get(Severity::Warning), 11);
        assert_eq!(alerts.by_dimension.get(&Dimension::Cpu), Some(&11));
        assert_eq!(alerts.by_dimension.get(&Dimension::Disk), Some(&0));
    }

    #[test]
    fn quiet_fleet_lists_every_dimension() {
        let summary = FleetSummary::from_scores(&[MachineScore::perfect("a", 0)]);
        let by_dimension = &summary.alert_distribution.by_dimension;

        assert_eq!(by_dimension.len(), Dimension::ALL.len());
        assert!(Dimension::ALL.iter().all(|d| by_dimension.get(d) == Some(&0)));
        assert_eq!(summary.alert_distribution.total_alerts, 0);
    }

    #[test]
    fn merged_chunks_match_single_pass() {
        let scores: Vec<MachineScore> = (0..7)
            .map(|i| score_with(&format!("h{i}"), (i * 15) as f64, i))
            .collect();

        let mut left = SummaryAccumulator::default();
        let mut right = SummaryAccumulator::default();
        for (i, score) in scores.iter().enumerate() {
            if i % 2 == 0 {
                left.add(score)
            } else {
                right.add(score)
            }
        }
        right.merge(left);

        assert_eq!(right.finish(), FleetSummary::from_scores(&scores));
    }
}
