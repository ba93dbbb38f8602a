//! Incremental metrics cache.
//!
//! One coordinator per workspace session. Save notifications arm a per-path
//! debounce timer; when it fires the eight scanners run on the blocking pool
//! and the resulting bundle replaces the cached one in a single store.
//!
//! Per path: `Unwatched -> Scheduled -> Computing -> Cached`, and back to
//! `Scheduled` on the next qualifying save.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{Notify, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CoordinatorSettings;
use crate::fs_utils::{gather_files, has_extension};
use crate::scanner::compute_bundle;
use crate::types::MetricsBundle;

/// What a save notification led to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Not a source file for this workspace.
    NotSource,
    /// The cached bundle is younger than the freshness window.
    Fresh,
    /// A debounce timer was (re)armed.
    Scheduled,
    /// The coordinator has been shut down.
    ShutDown,
}

/// Counters for diagnostics and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorStats {
    pub scheduled: u64,
    pub ignored_fresh: u64,
    pub computations: u64,
    pub discarded: u64,
}

struct PendingTimer {
    generation: u64,
    task: JoinHandle<()>,
}

struct Inner {
    settings: CoordinatorSettings,
    runtime: Handle,
    cache: RwLock<HashMap<PathBuf, Arc<MetricsBundle>>>,
    timers: Mutex<HashMap<PathBuf, PendingTimer>>,
    next_generation: AtomicU64,
    in_flight: AtomicUsize,
    shutdown: AtomicBool,
    idle: Notify,
    updates: broadcast::Sender<PathBuf>,
    scheduled: AtomicU64,
    ignored_fresh: AtomicU64,
    computations: AtomicU64,
    discarded: AtomicU64,
}

const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Cheap to clone; all clones share one cache and one timer registry.
#[derive(Clone)]
pub struct MetricsCoordinator {
    inner: Arc<Inner>,
}

impl MetricsCoordinator {
    /// Timers and computations are spawned on `runtime`.
    pub fn new(settings: CoordinatorSettings, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                runtime,
                cache: RwLock::new(HashMap::new()),
                timers: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
                shutdown: AtomicBool::new(false),
                idle: Notify::new(),
                updates: broadcast::channel(UPDATE_CHANNEL_CAPACITY).0,
                scheduled: AtomicU64::new(0),
                ignored_fresh: AtomicU64::new(0),
                computations: AtomicU64::new(0),
                discarded: AtomicU64::new(0),
            }),
        }
    }

    /// Paths whose bundle was just replaced, in store order.
    pub fn subscribe(&self) -> broadcast::Receiver<PathBuf> {
        self.inner.updates.subscribe()
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.inner.settings
    }

    /// Handle a save of `path`: ignore non-sources and fresh entries,
    /// otherwise cancel any pending timer for the path and arm a new one.
    pub fn notify_saved(&self, path: &Path) -> SaveOutcome {
        if self.is_shut_down() {
            return SaveOutcome::ShutDown;
        }
        if !has_extension(path, &self.inner.settings.extension) {
            return SaveOutcome::NotSource;
        }
        let key = cache_key(path);

        if let Some(bundle) = self.inner.read_cache().get(&key) {
            let age = (Utc::now() - bundle.timestamp).to_std().unwrap_or_default();
            if age < self.inner.settings.freshness {
                debug!("{} is fresh ({} ms old), save ignored", key.display(), age.as_millis());
                self.inner.ignored_fresh.fetch_add(1, Ordering::Relaxed);
                return SaveOutcome::Fresh;
            }
        }

        self.arm_timer(key);
        SaveOutcome::Scheduled
    }

    /// Cached bundle for `path`; never triggers a computation.
    pub fn get_metrics(&self, path: &Path) -> Option<Arc<MetricsBundle>> {
        self.inner.read_cache().get(&cache_key(path)).cloned()
    }

    /// Snapshot copy of the whole cache. Changing the returned map does not
    /// touch the coordinator's state.
    pub fn get_all_metrics(&self) -> HashMap<PathBuf, Arc<MetricsBundle>> {
        self.inner.read_cache().clone()
    }

    /// Recompute `path` now, bypassing freshness and debounce. Any pending
    /// timer for the path becomes redundant and is cancelled.
    ///
    /// Returns `None` once the coordinator has been shut down.
    pub fn force_recompute(&self, path: &Path) -> Option<Arc<MetricsBundle>> {
        if self.is_shut_down() {
            return None;
        }
        let key = cache_key(path);
        let pending = {
            let mut timers = self.inner.lock_timers();
            self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
            timers.remove(&key)
        };
        if let Some(pending) = pending {
            pending.task.abort();
        }
        let bundle = Arc::new(compute_bundle(&key));
        self.inner.computations.fetch_add(1, Ordering::Relaxed);
        let stored = self.inner.store(key, Arc::clone(&bundle));

        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.notify_if_idle();
        stored.then_some(bundle)
    }

    /// Enumerate every source file under `root` and send each through the
    /// save path. Returns how many were scheduled.
    pub fn warm_up(&self, root: &Path) -> usize {
        let settings = &self.inner.settings;
        let files = gather_files(root, &settings.extension, &settings.excluded_dirs);
        let scheduled = files
            .iter()
            .filter(|file| self.notify_saved(file) == SaveOutcome::Scheduled)
            .count();
        info!(
            "warm-up of {}: {} files found, {} scheduled",
            root.display(),
            files.len(),
            scheduled
        );
        scheduled
    }

    /// Timers armed but not yet fired.
    pub fn pending_count(&self) -> usize {
        self.inner.lock_timers().len()
    }

    /// Resolves once no timer is pending and no computation is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.inner.is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Cancel every outstanding timer. Computations already running finish
    /// but their results are discarded; later saves are refused.
    pub fn shutdown(&self) {
        {
            // Taken together with the store-side check, so no bundle can
            // land once this flag is visible.
            let _cache = self.inner.write_cache();
            self.inner.shutdown.store(true, Ordering::SeqCst);
        }
        let pending: Vec<PendingTimer> = self
            .inner
            .lock_timers()
            .drain()
            .map(|(_, timer)| timer)
            .collect();
        for timer in &pending {
            timer.task.abort();
        }
        info!("coordinator shut down, {} pending timers cancelled", pending.len());
        self.inner.notify_if_idle();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> CoordinatorStats {
        let inner = &self.inner;
        CoordinatorStats {
            scheduled: inner.scheduled.load(Ordering::Relaxed),
            ignored_fresh: inner.ignored_fresh.load(Ordering::Relaxed),
            computations: inner.computations.load(Ordering::Relaxed),
            discarded: inner.discarded.load(Ordering::Relaxed),
        }
    }

    fn arm_timer(&self, key: PathBuf) {
        let inner = &self.inner;
        let generation = inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let delay = inner.settings.debounce;

        let mut timers = inner.lock_timers();
        if let Some(previous) = timers.remove(&key) {
            previous.task.abort();
            debug!("debounce re-armed for {}", key.display());
        }

        let task_inner = Arc::clone(inner);
        let task_key = key.clone();
        let task = inner.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task_inner.fire(task_key, generation).await;
        });

        timers.insert(key, PendingTimer { generation, task });
        inner.scheduled.fetch_add(1, Ordering::Relaxed);
    }
}

impl Inner {
    /// Timer expiry: leave the registry, compute, store.
    async fn fire(self: Arc<Self>, key: PathBuf, generation: u64) {
        {
            let mut timers = self.lock_timers();
            // A superseded timer must not remove its successor's entry.
            if timers.get(&key).map(|t| t.generation) != Some(generation) {
                return;
            }
            timers.remove(&key);
            self.in_flight.fetch_add(1, Ordering::SeqCst);
        }

        let compute_key = key.clone();
        match tokio::task::spawn_blocking(move || compute_bundle(&compute_key)).await {
            Ok(bundle) => {
                self.computations.fetch_add(1, Ordering::Relaxed);
                self.store(key, Arc::new(bundle));
            }
            Err(e) => warn!("metrics computation for {} failed: {e}", key.display()),
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.notify_if_idle();
    }

    /// Replace the bundle for `key`. Returns `false` when discarded because
    /// shutdown has begun.
    fn store(&self, key: PathBuf, bundle: Arc<MetricsBundle>) -> bool {
        let mut cache = self.write_cache();
        if self.shutdown.load(Ordering::SeqCst) {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            debug!("discarding bundle for {} after shutdown", key.display());
            return false;
        }
        cache.insert(key.clone(), bundle);
        drop(cache);
        // No subscribers is fine.
        let _ = self.updates.send(key);
        true
    }

    fn is_idle(&self) -> bool {
        self.lock_timers().is_empty() && self.in_flight.load(Ordering::SeqCst) == 0
    }

    fn notify_if_idle(&self) {
        if self.is_idle() {
            self.idle.notify_waiters();
        }
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, Arc<MetricsBundle>>> {
        self.cache.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, Arc<MetricsBundle>>> {
        self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_timers(&self) -> MutexGuard<'_, HashMap<PathBuf, PendingTimer>> {
        self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Absolute form of `path`, used as the cache key.
fn cache_key(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tempfile::TempDir;

    const SOURCE: &str = r#"
public class Sample {
    private int a;
    void f() { if (a > 0) { a--; } }
    void g() { a++; }
}
"#;

    fn settings(debounce_ms: u64, freshness_ms: u64) -> CoordinatorSettings {
        CoordinatorSettings {
            debounce: Duration::from_millis(debounce_ms),
            freshness: Duration::from_millis(freshness_ms),
            ..CoordinatorSettings::default()
        }
    }

    fn workspace() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().expect("temp dir");
        let file = tmp.path().join("Sample.java");
        std::fs::write(&file, SOURCE).expect("write sample");
        (tmp, file)
    }

    #[tokio::test]
    async fn rapid_saves_collapse_into_one_computation() {
        let (_tmp, file) = workspace();
        let coord = MetricsCoordinator::new(settings(60, 0), Handle::current());

        assert_eq!(coord.notify_saved(&file), SaveOutcome::Scheduled);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(coord.notify_saved(&file), SaveOutcome::Scheduled);
        let second_save = Utc::now();
        assert_eq!(coord.pending_count(), 1);

        coord.wait_idle().await;

        let stats = coord.stats();
        assert_eq!(stats.scheduled, 2);
        assert_eq!(stats.computations, 1);
        let bundle = coord.get_metrics(&file).expect("computed");
        assert!(bundle.timestamp > second_save);
        assert_eq!(bundle.cyclomatic_complexity.value(), Some(2));
    }

    #[tokio::test]
    async fn fresh_bundle_ignores_saves() {
        let (_tmp, file) = workspace();
        let coord = MetricsCoordinator::new(settings(10, 60_000), Handle::current());

        coord.notify_saved(&file);
        coord.wait_idle().await;
        assert!(coord.get_metrics(&file).is_some());

        assert_eq!(coord.notify_saved(&file), SaveOutcome::Fresh);
        assert_eq!(coord.pending_count(), 0);
        assert_eq!(coord.stats().ignored_fresh, 1);
    }

    #[tokio::test]
    async fn stale_bundle_is_rescheduled() {
        let (_tmp, file) = workspace();
        let coord = MetricsCoordinator::new(settings(10, 20), Handle::current());

        coord.notify_saved(&file);
        coord.wait_idle().await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(coord.notify_saved(&file), SaveOutcome::Scheduled);
        coord.wait_idle().await;
        assert_eq!(coord.stats().computations, 2);
    }

    #[tokio::test]
    async fn non_source_paths_are_ignored() {
        let tmp = TempDir::new().expect("temp dir");
        let notes = tmp.path().join("notes.txt");
        std::fs::write(&notes, "class X {}").expect("write");
        let coord = MetricsCoordinator::new(settings(10, 0), Handle::current());

        assert_eq!(coord.notify_saved(&notes), SaveOutcome::NotSource);
        assert_eq!(coord.pending_count(), 0);
    }

    #[tokio::test]
    async fn get_metrics_never_computes() {
        let (_tmp, file) = workspace();
        let coord = MetricsCoordinator::new(settings(10, 0), Handle::current());
        assert!(coord.get_metrics(&file).is_none());
        assert_eq!(coord.stats().computations, 0);
    }

    #[tokio::test]
    async fn snapshot_is_a_copy() {
        let (_tmp, file) = workspace();
        let coord = MetricsCoordinator::new(settings(10, 0), Handle::current());
        coord.force_recompute(&file).expect("recomputed");

        let mut snapshot = coord.get_all_metrics();
        assert_eq!(snapshot.len(), 1);
        snapshot.clear();

        assert!(coord.get_metrics(&file).is_some());
        assert_eq!(coord.get_all_metrics().len(), 1);
    }

    #[tokio::test]
    async fn forced_recompute_is_idempotent() {
        let (_tmp, file) = workspace();
        let coord = MetricsCoordinator::new(settings(10, 60_000), Handle::current());

        let first = coord.force_recompute(&file).expect("first");
        let second = coord.force_recompute(&file).expect("second");
        assert!(first.same_values(&second));
        assert!(second.timestamp >= first.timestamp);
        assert!(Arc::ptr_eq(
            &second,
            &coord.get_metrics(&file).expect("cached")
        ));
    }

    #[tokio::test]
    async fn forced_recompute_cancels_pending_timer() {
        let (_tmp, file) = workspace();
        let coord = MetricsCoordinator::new(settings(5_000, 0), Handle::current());

        coord.notify_saved(&file);
        assert_eq!(coord.pending_count(), 1);
        coord.force_recompute(&file);
        assert_eq!(coord.pending_count(), 0);
        coord.wait_idle().await;
        assert_eq!(coord.stats().computations, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn wait_idle_covers_forced_recompute_on_another_thread() {
        let tmp = TempDir::new().expect("temp dir");
        let file = tmp.path().join("Big.java");
        let methods: String = (0..1500)
            .map(|i| format!("    void m{i}() {{ if (a > {i}) {{ a++; }} }}\n"))
            .collect();
        std::fs::write(&file, format!("public class Big {{\n    private int a;\n{methods}}}\n"))
            .expect("write big");
        let coord = MetricsCoordinator::new(settings(10, 0), Handle::current());

        let worker = coord.clone();
        let target = file.clone();
        let job = tokio::task::spawn_blocking(move || worker.force_recompute(&target));

        let mut saw_busy = false;
        while !job.is_finished() {
            if !coord.inner.is_idle() {
                saw_busy = true;
                break;
            }
            tokio::task::yield_now().await;
        }
        coord.wait_idle().await;

        assert!(saw_busy, "forced recompute never showed up as in flight");
        assert!(coord.get_metrics(&file).is_some());
        job.await.expect("join").expect("bundle");
    }

    #[tokio::test]
    async fn unreadable_file_is_cached_with_unavailable_metrics() {
        let tmp = TempDir::new().expect("temp dir");
        let missing = tmp.path().join("Gone.java");
        let coord = MetricsCoordinator::new(settings(10, 0), Handle::current());

        coord.notify_saved(&missing);
        coord.wait_idle().await;

        let bundle = coord.get_metrics(&missing).expect("cached anyway");
        assert!(bundle.readings().iter().all(|(_, v)| v.is_none()));
    }

    #[tokio::test]
    async fn paths_debounce_independently() {
        let tmp = TempDir::new().expect("temp dir");
        let a = tmp.path().join("A.java");
        let b = tmp.path().join("B.java");
        std::fs::write(&a, "class A {}").expect("write a");
        std::fs::write(&b, "class B { A a = new A(); }").expect("write b");
        let coord = MetricsCoordinator::new(settings(30, 0), Handle::current());

        coord.notify_saved(&a);
        coord.notify_saved(&b);
        assert_eq!(coord.pending_count(), 2);
        coord.wait_idle().await;

        assert_eq!(coord.stats().computations, 2);
        let a_metrics = coord.get_metrics(&a).expect("a");
        assert_eq!(a_metrics.afferent_coupling.value(), Some(1));
    }

    #[tokio::test]
    async fn warm_up_schedules_workspace_sources() {
        let tmp = TempDir::new().expect("temp dir");
        let root = tmp.path();
        std::fs::create_dir_all(root.join("src")).expect("src");
        std::fs::create_dir_all(root.join("target")).expect("target");
        std::fs::write(root.join("src/One.java"), "class One {}").expect("write");
        std::fs::write(root.join("src/Two.java"), "class Two {}").expect("write");
        std::fs::write(root.join("target/Gen.java"), "class Gen {}").expect("write");

        let coord = MetricsCoordinator::new(settings(10, 0), Handle::current());
        assert_eq!(coord.warm_up(root), 2);
        coord.wait_idle().await;

        let all = coord.get_all_metrics();
        assert_eq!(all.len(), 2);
        assert!(all.keys().all(|p| !p.starts_with(root.join("target"))));
    }

    #[tokio::test]
    async fn subscribers_hear_about_stores() {
        let (_tmp, file) = workspace();
        let coord = MetricsCoordinator::new(settings(10, 0), Handle::current());
        let mut updates = coord.subscribe();

        coord.notify_saved(&file);
        let updated = updates.recv().await.expect("update");
        assert_eq!(updated, cache_key(&file));
        assert!(coord.get_metrics(&updated).is_some());
    }

    #[tokio::test]
    async fn shutdown_cancels_timers_and_refuses_work() {
        let (_tmp, file) = workspace();
        let coord = MetricsCoordinator::new(settings(30, 0), Handle::current());

        coord.notify_saved(&file);
        coord.shutdown();
        assert_eq!(coord.pending_count(), 0);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(coord.get_metrics(&file).is_none());
        assert_eq!(coord.notify_saved(&file), SaveOutcome::ShutDown);
        assert!(coord.force_recompute(&file).is_none());
        coord.wait_idle().await;
    }
}
