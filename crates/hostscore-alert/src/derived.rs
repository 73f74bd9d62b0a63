//! Ratios computed from a raw [`MetricSample`].
//!
//! A value that cannot be computed (missing input, zero denominator,
//! non-finite result) is `None`, never zero.

use hostscore_common::types::MetricSample;
use serde::{Deserialize, Serialize};

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// `cpu_usr + cpu_sys + cpu_iow`; all three inputs are required.
pub fn cpu_usage_rate(usr: Option<f64>, sys: Option<f64>, iow: Option<f64>) -> Option<f64> {
    finite(round2(usr? + sys? + iow?))
}

/// `(1 - mem_free / mem_total) * 100`, absent when `mem_total <= 0`.
pub fn memory_usage_rate(total: Option<i64>, free: Option<i64>) -> Option<f64> {
    let total = total.filter(|t| *t > 0)? as f64;
    let free = free? as f64;
    finite(round2((1.0 - free / total) * 100.0))
}

/// `swap_used / swap_total * 100`, absent when `swap_total <= 0`.
pub fn swap_usage_rate(total: Option<i64>, used: Option<i64>) -> Option<f64> {
    let total = total.filter(|t| *t > 0)? as f64;
    let used = used? as f64;
    finite(round2(used / total * 100.0))
}

/// `max(0, rx) + max(0, tx)`. Counter resets report negative rates; they are
/// clamped before summing so the total is never negative.
pub fn network_rate(rx_kbps: Option<f64>, tx_kbps: Option<f64>) -> Option<f64> {
    let rx = rx_kbps?.max(0.0);
    let tx = tx_kbps?.max(0.0);
    finite(round2(rx + tx))
}

/// The collector's `disk_used_percent`, passed through unrounded.
pub fn disk_usage_rate(used_percent: Option<f64>) -> Option<f64> {
    finite(used_percent?)
}

/// The derived view of one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub cpu_usage_rate: Option<f64>,
    pub memory_usage_rate: Option<f64>,
    pub swap_usage_rate: Option<f64>,
    pub network_rate: Option<f64>,
    pub disk_usage_rate: Option<f64>,
}

impl DerivedMetrics {
    pub fn from_sample(sample: &MetricSample) -> Self {
        Self {
            cpu_usage_rate: cpu_usage_rate(sample.cpu_usr, sample.cpu_sys, sample.cpu_iow),
            memory_usage_rate: memory_usage_rate(sample.mem_total, sample.mem_free),
            swap_usage_rate: swap_usage_rate(sample.swap_total, sample.swap_used),
            network_rate: network_rate(sample.net_rx_kbps, sample.net_tx_kbps),
            disk_usage_rate: disk_usage_rate(sample.disk_used_percent),
        }
    }
}
