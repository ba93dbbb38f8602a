use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MetricError;

/// Outcome of one scanner run.
///
/// Serialized untagged: an available metric is the bare number, an
/// unavailable one is `{"unavailable": "<reason>"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric<T> {
    Value(T),
    Unavailable { unavailable: String },
}

impl<T: Copy> Metric<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Value(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Metric::Value(_) => None,
            Metric::Unavailable { unavailable } => Some(unavailable),
        }
    }
}

impl<T: Copy + Into<f64>> Metric<T> {
    /// Legacy numeric form: the value itself, or `-1.0` when unavailable.
    pub fn sentinel(&self) -> f64 {
        self.value().map(Into::into).unwrap_or(-1.0)
    }
}

impl<T> From<Result<T, MetricError>> for Metric<T> {
    fn from(result: Result<T, MetricError>) -> Self {
        match result {
            Ok(value) => Metric::Value(value),
            Err(e) => Metric::Unavailable {
                unavailable: e.to_string(),
            },
        }
    }
}

/// The eight metrics of one file, computed together and stored atomically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBundle {
    pub afferent_coupling: Metric<u32>,
    pub cognitive_complexity: Metric<u32>,
    pub cyclomatic_complexity: Metric<u32>,
    pub efferent_coupling: Metric<u32>,
    pub instability: Metric<f64>,
    pub lcom: Metric<u32>,
    pub tcc: Metric<f64>,
    pub wmc: Metric<u32>,
    /// When this bundle was computed.
    pub timestamp: DateTime<Utc>,
}

impl MetricsBundle {
    /// Readings in the stable field order, `None` for unavailable metrics.
    pub fn readings(&self) -> [(MetricKind, Option<f64>); 8] {
        [
            (
                MetricKind::AfferentCoupling,
                self.afferent_coupling.value().map(f64::from),
            ),
            (
                MetricKind::CognitiveComplexity,
                self.cognitive_complexity.value().map(f64::from),
            ),
            (
                MetricKind::CyclomaticComplexity,
                self.cyclomatic_complexity.value().map(f64::from),
            ),
            (
                MetricKind::EfferentCoupling,
                self.efferent_coupling.value().map(f64::from),
            ),
            (MetricKind::Instability, self.instability.value()),
            (MetricKind::Lcom, self.lcom.value().map(f64::from)),
            (MetricKind::Tcc, self.tcc.value()),
            (MetricKind::Wmc, self.wmc.value().map(f64::from)),
        ]
    }

    /// True when every metric equals `other`'s, ignoring timestamps.
    pub fn same_values(&self, other: &MetricsBundle) -> bool {
        self.readings() == other.readings()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    AfferentCoupling,
    CognitiveComplexity,
    CyclomaticComplexity,
    EfferentCoupling,
    Instability,
    Lcom,
    Tcc,
    Wmc,
}

impl MetricKind {
    pub const ALL: [MetricKind; 8] = [
        MetricKind::AfferentCoupling,
        MetricKind::CognitiveComplexity,
        MetricKind::CyclomaticComplexity,
        MetricKind::EfferentCoupling,
        MetricKind::Instability,
        MetricKind::Lcom,
        MetricKind::Tcc,
        MetricKind::Wmc,
    ];

    /// Label used in the `name: value` text rendering. Part of the
    /// downstream text contract; do not rename.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::AfferentCoupling => "afferentCoupling",
            MetricKind::CognitiveComplexity => "cognitiveComplexity",
            MetricKind::CyclomaticComplexity => "cyclomaticComplexity",
            MetricKind::EfferentCoupling => "efferentCoupling",
            MetricKind::Instability => "instability",
            MetricKind::Lcom => "lcom",
            MetricKind::Tcc => "tcc",
            MetricKind::Wmc => "wmc",
        }
    }

    /// Ratios are reals in [0, 1]; everything else is a count.
    pub fn is_ratio(&self) -> bool {
        matches!(self, MetricKind::Instability | MetricKind::Tcc)
    }

    /// Classify a reading into the usual industry bands.
    pub fn rating(&self, value: f64) -> Rating {
        // Upper bounds for VeryGood / Acceptable / Warning; above is Bad.
        let bands = match self {
            MetricKind::AfferentCoupling => [3.0, 7.0, 12.0],
            MetricKind::CognitiveComplexity => [5.0, 10.0, 20.0],
            MetricKind::CyclomaticComplexity => [5.0, 10.0, 15.0],
            MetricKind::EfferentCoupling => [5.0, 10.0, 20.0],
            MetricKind::Instability => [0.2, 0.5, 0.8],
            MetricKind::Lcom => [0.0, 2.0, 5.0],
            MetricKind::Wmc => [10.0, 20.0, 40.0],
            MetricKind::Tcc => {
                // Higher cohesion is better.
                return if value >= 0.8 {
                    Rating::VeryGood
                } else if value >= 0.5 {
                    Rating::Acceptable
                } else if value >= 0.3 {
                    Rating::Warning
                } else {
                    Rating::Bad
                };
            }
        };
        if value <= bands[0] {
            Rating::VeryGood
        } else if value <= bands[1] {
            Rating::Acceptable
        } else if value <= bands[2] {
            Rating::Warning
        } else {
            Rating::Bad
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    VeryGood,
    Acceptable,
    Warning,
    Bad,
}

impl Rating {
    pub fn as_label(&self) -> &'static str {
        match self {
            Rating::VeryGood => "very good",
            Rating::Acceptable => "acceptable",
            Rating::Warning => "warning",
            Rating::Bad => "bad",
        }
    }
}
