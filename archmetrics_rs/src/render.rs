//! Text and JSON renderings of metric bundles.
//!
//! The `label: value` text form is consumed by downstream tooling that
//! embeds it in free text, so labels and field order stay fixed.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::types::{MetricKind, MetricsBundle};

/// `-1` for unavailable metrics, two decimals for ratios, integers
/// otherwise.
pub fn format_value(kind: MetricKind, value: Option<f64>) -> String {
    match value {
        None => "-1".to_string(),
        Some(v) if kind.is_ratio() => format!("{v:.2}"),
        Some(v) => format!("{v:.0}"),
    }
}

/// The eight `label: value` lines in fixed order. With `verbose`, each
/// available reading is followed by its rating band.
pub fn render_bundle(bundle: &MetricsBundle, verbose: bool) -> String {
    let mut out = String::new();
    for (kind, value) in bundle.readings() {
        let _ = write!(out, "{}: {}", kind.label(), format_value(kind, value));
        if verbose && let Some(v) = value {
            let _ = write!(out, " ({})", kind.rating(v).as_label());
        }
        out.push('\n');
    }
    out
}

/// Block for inclusion in outbound free text.
pub fn metrics_block(path: &Path, bundle: &MetricsBundle) -> String {
    format!(
        "File name: {}\n\nFile metrics:\n{}",
        path.display(),
        render_bundle(bundle, false)
    )
}

#[derive(Serialize)]
struct FileEntry<'a> {
    path: String,
    #[serde(flatten)]
    bundle: &'a MetricsBundle,
}

pub fn bundle_json(path: &Path, bundle: &MetricsBundle) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&FileEntry {
        path: path.display().to_string(),
        bundle,
    })
}

/// Whole cache as a JSON object keyed by path, sorted for stable output.
pub fn snapshot_json(snapshot: &HashMap<PathBuf, Arc<MetricsBundle>>) -> serde_json::Result<String> {
    let sorted: BTreeMap<String, &MetricsBundle> = snapshot
        .iter()
        .map(|(path, bundle)| (path.display().to_string(), bundle.as_ref()))
        .collect();
    serde_json::to_string_pretty(&sorted)
}

/// Every bundle as a text block, sorted by path.
pub fn snapshot_text(snapshot: &HashMap<PathBuf, Arc<MetricsBundle>>, verbose: bool) -> String {
    let mut paths: Vec<&PathBuf> = snapshot.keys().collect();
    paths.sort();
    let mut out = String::new();
    for path in paths {
        let _ = writeln!(out, "{}", path.display());
        for line in render_bundle(&snapshot[path], verbose).lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metric;
    use chrono::{TimeZone, Utc};

    fn bundle() -> MetricsBundle {
        MetricsBundle {
            afferent_coupling: Metric::Value(2),
            cognitive_complexity: Metric::Value(7),
            cyclomatic_complexity: Metric::Value(4),
            efferent_coupling: Metric::Value(3),
            instability: Metric::Value(0.6),
            lcom: Metric::Value(0),
            tcc: Metric::Unavailable {
                unavailable: "cannot read X.java".to_string(),
            },
            wmc: Metric::Value(9),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn renders_fixed_order_with_sentinel() {
        let text = render_bundle(&bundle(), false);
        assert_eq!(
            text,
            "afferentCoupling: 2\n\
             cognitiveComplexity: 7\n\
             cyclomaticComplexity: 4\n\
             efferentCoupling: 3\n\
             instability: 0.60\n\
             lcom: 0\n\
             tcc: -1\n\
             wmc: 9\n"
        );
    }

    #[test]
    fn verbose_appends_rating_for_available_metrics() {
        let text = render_bundle(&bundle(), true);
        assert!(text.contains("cyclomaticComplexity: 4 (very good)"));
        assert!(text.contains("instability: 0.60 (warning)"));
        assert!(text.contains("tcc: -1\n"));
    }

    #[test]
    fn metrics_block_has_header() {
        let block = metrics_block(Path::new("/ws/src/A.java"), &bundle());
        assert!(block.starts_with("File name: /ws/src/A.java\n\nFile metrics:\nafferentCoupling: 2\n"));
        assert!(block.ends_with("wmc: 9\n"));
    }

    #[test]
    fn json_uses_camel_case_and_rfc3339() {
        let json = bundle_json(Path::new("A.java"), &bundle()).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["path"], "A.java");
        assert_eq!(value["cyclomaticComplexity"], 4);
        assert_eq!(value["tcc"]["unavailable"], "cannot read X.java");
        assert_eq!(value["timestamp"], "2025-03-01T12:00:00Z");
    }

    #[test]
    fn snapshot_json_is_keyed_by_path() {
        let mut snapshot = HashMap::new();
        snapshot.insert(PathBuf::from("/ws/B.java"), Arc::new(bundle()));
        snapshot.insert(PathBuf::from("/ws/A.java"), Arc::new(bundle()));
        let json = snapshot_json(&snapshot).expect("json");
        let a = json.find("/ws/A.java").expect("a");
        let b = json.find("/ws/B.java").expect("b");
        assert!(a < b);
        assert!(snapshot_text(&snapshot, false).starts_with("/ws/A.java\n  afferentCoupling: 2\n"));
    }
}
