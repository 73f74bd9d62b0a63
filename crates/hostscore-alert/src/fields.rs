//! Field catalog: every metric name a rule may reference, where its value
//! comes from, and which scoring dimension it belongs to.
//!
//! Field resolution and dimension classification both read [`FIELDS`], so
//! the two can never disagree about a name.

use crate::derived::DerivedMetrics;
use hostscore_common::i18n::TRANSLATIONS;
use hostscore_common::types::MetricSample;
use serde::{Deserialize, Serialize};

/// The five fixed scoring dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "CPU")]
    Cpu,
    Memory,
    Disk,
    Network,
    Swap,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Cpu,
        Dimension::Memory,
        Dimension::Disk,
        Dimension::Network,
        Dimension::Swap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Cpu => "CPU",
            Dimension::Memory => "Memory",
            Dimension::Disk => "Disk",
            Dimension::Network => "Network",
            Dimension::Swap => "Swap",
        }
    }

    /// Localised display label.
    pub fn label(&self, locale: &str) -> &'static str {
        let key = match self {
            Dimension::Cpu => "dimension.cpu",
            Dimension::Memory => "dimension.memory",
            Dimension::Disk => "dimension.disk",
            Dimension::Network => "dimension.network",
            Dimension::Swap => "dimension.swap",
        };
        TRANSLATIONS.get(locale, key, self.as_str())
    }

    /// Maps a field name to its dimension. Fields outside the catalog
    /// belong to no dimension and are excluded from scoring.
    ///
    /// ```
    /// use hostscore_alert::fields::Dimension;
    ///
    /// assert_eq!(Dimension::for_field("system_cs"), Some(Dimension::Cpu));
    /// assert_eq!(Dimension::for_field("network_rate"), Some(Dimension::Network));
    /// assert_eq!(Dimension::for_field("uptime"), None);
    /// ```
    pub fn for_field(field: &str) -> Option<Dimension> {
        field_spec(field).map(|spec| spec.dimension)
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a field's value is read from.
#[derive(Clone, Copy)]
pub enum FieldSource {
    Derived(fn(&DerivedMetrics) -> Option<f64>),
    Raw(fn(&MetricSample) -> Option<f64>),
}

pub struct FieldSpec {
    pub name: &'static str,
    pub dimension: Dimension,
    pub source: FieldSource,
}

macro_rules! derived {
    ($name:ident, $dim:ident) => {
        FieldSpec {
            name: stringify!($name),
            dimension: Dimension::$dim,
            source: FieldSource::Derived(|d| d.$name),
        }
    };
}

macro_rules! raw_f64 {
    ($name:ident, $dim:ident) => {
        FieldSpec {
            name: stringify!($name),
            dimension: Dimension::$dim,
            source: FieldSource::Raw(|s| s.$name),
        }
    };
}

macro_rules! raw_i64 {
    ($name:ident, $dim:ident) => {
        FieldSpec {
            name: stringify!($name),
            dimension: Dimension::$dim,
            source: FieldSource::Raw(|s| s.$name.map(|v| v as f64)),
        }
    };
}

/// Derived fields come first: a name is looked up among the derived
/// metrics before the raw counters.
pub static FIELDS: &[FieldSpec] = &[
    derived!(cpu_usage_rate, Cpu),
    derived!(memory_usage_rate, Memory),
    derived!(disk_usage_rate, Disk),
    derived!(network_rate, Network),
    derived!(swap_usage_rate, Swap),
    // cpu
    raw_f64!(cpu_usr, Cpu),
    raw_f64!(cpu_sys, Cpu),
    raw_f64!(cpu_iow, Cpu),
    raw_i64!(system_in, Cpu),
    raw_i64!(system_cs, Cpu),
    // memory
    raw_i64!(mem_total, Memory),
    raw_i64!(mem_free, Memory),
    raw_i64!(mem_buff, Memory),
    raw_i64!(mem_cache, Memory),
    // disk
    raw_i64!(disk_total, Disk),
    raw_i64!(disk_used, Disk),
    raw_f64!(disk_used_percent, Disk),
    raw_i64!(disk_iops, Disk),
    raw_i64!(disk_r, Disk),
    raw_i64!(disk_w, Disk),
    // network
    raw_f64!(net_rx_kbps, Network),
    raw_f64!(net_tx_kbps, Network),
    raw_f64!(net_rx_kbytes, Network),
    raw_f64!(net_tx_kbytes, Network),
    // swap
    raw_i64!(swap_total, Swap),
    raw_i64!(swap_used, Swap),
    raw_i64!(swap_in, Swap),
    raw_i64!(swap_out, Swap),
];

pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.name == name)
}

/// Resolves the value of `name` for one sample. `None` when the name is
/// unknown or the value is missing or non-finite.
pub fn field_value(name: &str, sample: &MetricSample, derived: &DerivedMetrics) -> Option<f64> {
    let value = match field_spec(name)?.source {
        FieldSource::Derived(get) => get(derived),
        FieldSource::Raw(get) => get(sample),
    };
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn field_names_are_unique() {
        let mut seen = HashSet::new();
        for spec in FIELDS {
            assert!(seen.insert(spec.name), "duplicate field {}", spec.name);
        }
    }

    #[test]
    fn every_dimension_has_a_derived_field() {
        for dim in Dimension::ALL {
            assert!(
                FIELDS
                    .iter()
                    .any(|s| s.dimension == dim && matches!(s.source, FieldSource::Derived(_))),
                "no derived field for {dim}"
            );
        }
    }

    #[test]
    fn classifies_documented_cpu_fields() {
        for name in ["cpu_usr", "cpu_sys", "cpu_iow", "cpu_usage_rate", "system_in", "system_cs"] {
            assert_eq!(Dimension::for_field(name), Some(Dimension::Cpu), "{name}");
        }
        for name in ["swap_total", "swap_used", "swap_in", "swap_out", "swap_usage_rate"] {
            assert_eq!(Dimension::for_field(name), Some(Dimension::Swap), "{name}");
        }
        assert_eq!(Dimension::for_field("disk_name"), None);
        assert_eq!(Dimension::for_field("version"), None);
    }

    #[test]
    fn resolves_derived_then_raw_values() {
        let sample = MetricSample {
            cpu_usr: Some(70.0),
            cpu_sys: Some(20.0),
            cpu_iow: Some(5.0),
            mem_total: Some(2048),
            disk_used_percent: Some(f64::INFINITY),
            ..MetricSample::new("10.0.0.5", 1)
        };
        let derived = DerivedMetrics::from_sample(&sample);

        assert_eq!(field_value("cpu_usage_rate", &sample, &derived), Some(95.0));
        assert_eq!(field_value("cpu_usr", &sample, &derived), Some(70.0));
        assert_eq!(field_value("mem_total", &sample, &derived), Some(2048.0));
        assert_eq!(field_value("mem_free", &sample, &derived), None);
        assert_eq!(field_value("memory_usage_rate", &sample, &derived), None);
        assert_eq!(field_value("disk_used_percent", &sample, &derived), None);
        assert_eq!(field_value("no_such_field", &sample, &derived), None);
    }

    #[test]
    fn labels_follow_locale() {
        assert_eq!(Dimension::Memory.label("zh-CN"), "内存");
        assert_eq!(Dimension::Memory.label("en"), "Memory");
        assert_eq!(Dimension::Cpu.to_string(), "CPU");
    }
}
