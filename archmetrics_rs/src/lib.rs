//! # archmetrics
//!
//! **Incremental Java quality metrics** - lightweight, parser-free scanners
//! plus a debounced per-file cache that stays fresh during an editing
//! session.
//!
//! ## Metrics
//!
//! - **Cyclomatic / Cognitive Complexity** - decision points, weighted by nesting
//! - **WMC** - sum of per-method complexities
//! - **LCOM / TCC** - cohesion from the method-to-field usage graph
//! - **Ca / Ce / Instability** - coupling with sibling files in the same package
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,no_run
//! use archmetrics::{render, scanner};
//! use std::path::Path;
//!
//! let bundle = scanner::compute_bundle(Path::new("src/main/java/App.java"));
//! print!("{}", render::render_bundle(&bundle, false));
//! ```
//!
//! ## Live Cache
//!
//! ```rust,no_run
//! use archmetrics::{ArchMetricsConfig, MetricsCoordinator};
//! use std::path::Path;
//!
//! # async fn demo() {
//! let config = ArchMetricsConfig::load(Path::new("."));
//! let coordinator =
//!     MetricsCoordinator::new(config.coordinator_settings(), tokio::runtime::Handle::current());
//! coordinator.warm_up(Path::new("."));
//! coordinator.wait_idle().await;
//! println!("{} files cached", coordinator.get_all_metrics().len());
//! # }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! archmetrics analyze src/App.java   # One bundle, computed now
//! archmetrics scan .                 # Warm the whole workspace
//! archmetrics watch .                # Recompute on save
//! archmetrics relations .            # extends / implements graph
//! ```

// ============================================================================
// Core Modules
// ============================================================================

/// Comment/string stripping, generic-aware list splitting, keyword tables.
pub mod lexical;

/// Single-line detectors for type, method and field declarations.
pub mod declarations;

/// Shared lazily compiled patterns.
pub(crate) mod regexes;

/// The eight metric scanners and bundle assembly.
///
/// # Submodules
///
/// - [`scanner::cyclomatic`] - Cyclomatic complexity
/// - [`scanner::cognitive`] - Cognitive complexity
/// - [`scanner::wmc`] - Weighted Method Count
/// - [`scanner::lcom`] - Lack of Cohesion of Methods
/// - [`scanner::tcc`] - Tight Class Cohesion
/// - [`scanner::efferent`] - Efferent coupling
/// - [`scanner::afferent`] - Afferent coupling
/// - [`scanner::instability`] - Instability
pub mod scanner;

/// Debounced per-file metrics cache.
pub mod coordinator;

// ============================================================================
// Support Modules
// ============================================================================

pub mod config;
pub mod error;
pub mod fs_utils;
pub mod relations;
pub mod render;
pub mod types;

/// Filesystem watcher feeding the coordinator.
pub mod watch;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ArchMetricsConfig, CoordinatorSettings};
pub use coordinator::{CoordinatorStats, MetricsCoordinator, SaveOutcome};
pub use error::MetricError;
pub use types::{Metric, MetricKind, MetricsBundle, Rating};
