//! Line-oriented metric scanners.
//!
//! Every scanner comes in two shapes: a path-based entry point that reads
//! the file (and, for coupling metrics, its directory) and returns a
//! `Result`, and a pure `*_from_source(s)` function over text.

pub mod afferent;
mod cohesion;
pub mod cognitive;
pub mod cyclomatic;
pub mod efferent;
pub mod instability;
pub mod lcom;
pub mod tcc;
pub mod wmc;

use std::path::Path;

use chrono::Utc;
use tracing::debug;

use crate::types::{Metric, MetricsBundle};

pub use afferent::{afferent_coupling, afferent_from_sources};
pub use cognitive::{cognitive_complexity, cognitive_from_source};
pub use cyclomatic::{cyclomatic_complexity, cyclomatic_from_source};
pub use efferent::{dependency_set, efferent_coupling, efferent_from_source};
pub use instability::{instability, instability_from_sources};
pub use lcom::{lack_of_cohesion, lcom_from_source};
pub use tcc::{tcc_from_source, tight_class_cohesion};
pub use wmc::{weighted_method_count, wmc_from_source};

/// Run all eight scanners against `path`.
///
/// Never fails: each scanner reads the file on its own, and a failing one
/// only marks its own metric unavailable.
pub fn compute_bundle(path: &Path) -> MetricsBundle {
    let bundle = MetricsBundle {
        afferent_coupling: Metric::from(afferent_coupling(path)),
        cognitive_complexity: Metric::from(cognitive_complexity(path)),
        cyclomatic_complexity: Metric::from(cyclomatic_complexity(path)),
        efferent_coupling: Metric::from(efferent_coupling(path)),
        instability: Metric::from(instability(path)),
        lcom: Metric::from(lack_of_cohesion(path)),
        tcc: Metric::from(tight_class_cohesion(path)),
        wmc: Metric::from(weighted_method_count(path)),
        timestamp: Utc::now(),
    };
    let failed = bundle
        .readings()
        .iter()
        .filter(|(_, value)| value.is_none())
        .count();
    debug!(
        "computed metrics for {} ({} unavailable)",
        path.display(),
        failed
    );
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_file_yields_fully_unavailable_bundle() {
        let bundle = compute_bundle(Path::new("/no/such/place/Ghost.java"));
        assert!(bundle.readings().iter().all(|(_, v)| v.is_none()));
        assert!(
            bundle
                .cyclomatic_complexity
                .reason()
                .expect("reason")
                .contains("Ghost.java")
        );
    }

    #[test]
    fn mixed_bundle_keeps_valid_metrics() {
        let tmp = tempfile::tempdir().expect("tmp dir");
        let file = tmp.path().join("Constants.java");
        std::fs::write(&file, "enum Constants { A, B }\n").expect("write");

        let bundle = compute_bundle(&file);
        assert_eq!(bundle.cyclomatic_complexity.value(), Some(1));
        assert_eq!(bundle.afferent_coupling.value(), Some(0));
        assert!(!bundle.instability.is_available());
        assert_eq!(bundle.instability.sentinel(), -1.0);
    }
}
