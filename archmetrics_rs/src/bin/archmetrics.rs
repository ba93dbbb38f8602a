//! # archmetrics
//!
//! Command-line front end for the metrics engine.
//!
//! ```bash
//! archmetrics analyze src/App.java --json
//! archmetrics scan . --verbose
//! archmetrics watch .
//! archmetrics relations .
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Handle;
use tracing::{debug, info};

use archmetrics::relations::collect_hierarchy;
use archmetrics::{ArchMetricsConfig, CoordinatorSettings, MetricsCoordinator, render, watch};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "archmetrics")]
#[command(about = "Quality metrics for Java sources, kept fresh as files change")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Debounce delay before a save is recomputed (overrides config)
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Saves are ignored while a bundle is younger than this (overrides config)
    #[arg(long, global = true)]
    freshness_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the metrics of one file right now
    Analyze {
        file: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// Append a rating band to every reading
        #[arg(long)]
        verbose: bool,
    },
    /// Warm the whole workspace and print every bundle
    Scan {
        #[arg(default_value = ".")]
        root: PathBuf,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        verbose: bool,
    },
    /// Recompute files as they are saved until Ctrl+C
    Watch {
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Print the extends / implements graph
    Relations {
        #[arg(default_value = ".")]
        root: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

impl Args {
    fn settings(&self, root: &Path) -> CoordinatorSettings {
        let mut settings = ArchMetricsConfig::load(root).coordinator_settings();
        if let Some(ms) = self.debounce_ms {
            settings.debounce = std::time::Duration::from_millis(ms);
        }
        if let Some(ms) = self.freshness_ms {
            settings.freshness = std::time::Duration::from_millis(ms);
        }
        settings
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn analyze(args: &Args, file: &Path, json: bool, verbose: bool) -> Result<()> {
    let coordinator = MetricsCoordinator::new(args.settings(Path::new(".")), Handle::current());
    let target = file.to_path_buf();
    let worker = coordinator.clone();
    let bundle = tokio::task::spawn_blocking(move || worker.force_recompute(&target))
        .await
        .context("metrics computation panicked")?
        .context("coordinator already shut down")?;

    if json {
        println!("{}", render::bundle_json(file, &bundle)?);
    } else if verbose {
        println!("File name: {}\n", file.display());
        print!("{}", render::render_bundle(&bundle, true));
    } else {
        print!("{}", render::metrics_block(file, &bundle));
    }
    Ok(())
}

async fn scan(args: &Args, root: &Path, json: bool, verbose: bool) -> Result<()> {
    let root = canonical_root(root)?;
    let coordinator = MetricsCoordinator::new(args.settings(&root), Handle::current());

    let scheduled = coordinator.warm_up(&root);
    coordinator.wait_idle().await;
    let snapshot = coordinator.get_all_metrics();
    coordinator.shutdown();
    info!("scan finished: {} scheduled, {} cached", scheduled, snapshot.len());

    if json {
        println!("{}", render::snapshot_json(&snapshot)?);
    } else {
        print!("{}", render::snapshot_text(&snapshot, verbose));
        eprintln!("{} files analyzed", snapshot.len());
    }
    Ok(())
}

async fn watch_root(args: &Args, root: &Path) -> Result<()> {
    let root = canonical_root(root)?;
    let coordinator = MetricsCoordinator::new(args.settings(&root), Handle::current());
    eprintln!("Watching {} (Ctrl+C to exit)", root.display());

    watch::watch_workspace(coordinator, &root, |path, bundle| {
        let timestamp = bundle.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S");
        println!("[{timestamp}]");
        println!("{}", render::metrics_block(path, bundle));
    })
    .await
}

fn relations(args: &Args, root: &Path, json: bool) -> Result<()> {
    let root = canonical_root(root)?;
    let settings = args.settings(&root);
    let hierarchy = collect_hierarchy(&root, &settings.extension, &settings.excluded_dirs);
    debug!(
        "{} types, {} relations",
        hierarchy.types.len(),
        hierarchy.relations.len()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&hierarchy)?);
    } else {
        print!("{}", hierarchy.render());
    }
    Ok(())
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    root.canonicalize()
        .with_context(|| format!("cannot open workspace {}", root.display()))
}

async fn run() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the metrics.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap_or_default()),
        )
        .init();

    debug!("archmetrics v{}", env!("CARGO_PKG_VERSION"));

    match &args.command {
        Command::Analyze {
            file,
            json,
            verbose,
        } => analyze(&args, file, *json, *verbose).await,
        Command::Scan {
            root,
            json,
            verbose,
        } => scan(&args, root, *json, *verbose).await,
        Command::Watch { root } => watch_root(&args, root).await,
        Command::Relations { root, json } => relations(&args, root, *json),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[archmetrics] Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
