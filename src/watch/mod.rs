pub mod rebuild;
pub mod snapshot;

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use spdlog::{debug, error, info};

use crate::config::{Config, WatchTarget};
use crate::watch::rebuild::{BuildOutcome, Rebuild};
use crate::watch::snapshot::{Change, Scan, Snapshot};

/// Granularity of the stop check while waiting for the next poll.
const STOP_CHECK_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WatchState {
    Idle,
    Scanning,
    Comparing,
    Rebuilding,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Unchanged,
    Rebuilt(BuildOutcome),
    /// `stop` was raised before the rebuild started; nothing was run.
    Stopped,
}

/// Polls the watched files and runs one rebuild per batch of detected changes.
pub struct Watcher<S: Scan, R: Rebuild> {
    scanner: S,
    rebuilder: R,
    interval: Duration,
    last: Snapshot,
    state: WatchState,
}

impl<S: Scan, R: Rebuild> Watcher<S, R> {
    /// Takes the initial snapshot; files present now do not trigger a rebuild.
    pub fn new(mut scanner: S, rebuilder: R, interval: Duration) -> Self {
        let last = scanner.scan();
        info!("Watching {} files", last.len());
        Watcher {
            scanner,
            rebuilder,
            interval,
            last,
            state: WatchState::Idle,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.last
    }

    /// One Scanning → Comparing → Rebuilding pass. `stop` is checked between phases.
    pub fn poll(&mut self, stop: &AtomicBool) -> PollOutcome {
        self.state = WatchState::Scanning;
        let current = self.scanner.scan();
        if stop.load(Ordering::SeqCst) {
            self.state = WatchState::Idle;
            return PollOutcome::Stopped;
        }

        self.state = WatchState::Comparing;
        let changes = self.last.diff(&current);
        if changes.is_empty() {
            self.state = WatchState::Idle;
            return PollOutcome::Unchanged;
        }

        for change in changes.iter() {
            match change {
                Change::Added(path) => debug!("Added: {}", path.display()),
                Change::Removed(path) => debug!("Removed: {}", path.display()),
                Change::Modified(path) => debug!("Modified: {}", path.display()),
            }
        }

        if stop.load(Ordering::SeqCst) {
            self.state = WatchState::Idle;
            return PollOutcome::Stopped;
        }

        self.state = WatchState::Rebuilding;
        info!("Changes detected, rebuilding...");
        let start = Instant::now();
        let outcome = self.rebuilder.rebuild();
        match outcome {
            BuildOutcome::Succeeded => info!("Site rebuilt successfully, cost(ms): {:.2}",
                                             start.elapsed().as_secs_f64() * 1000.0),
            BuildOutcome::Failed(ref reason) => error!("Build failed: {}", reason),
        }

        // a failed build is not retried until the files change again
        self.last = current;
        self.state = WatchState::Idle;
        PollOutcome::Rebuilt(outcome)
    }

    /// Polls every interval until `stop` is set.
    pub fn run(&mut self, stop: &AtomicBool) {
        info!("Watching for changes every {}s, press Ctrl+C to stop", self.interval.as_secs_f64());
        while !stop.load(Ordering::SeqCst) {
            if self.poll(stop) == PollOutcome::Stopped {
                break;
            }
            if !sleep_unless_stopped(self.interval, stop) {
                break;
            }
        }
        info!("Stopped watching");
    }
}

/// Returns `false` if `stop` was raised while sleeping.
fn sleep_unless_stopped(interval: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(STOP_CHECK_SLICE.min(deadline - now));
    }
}

/// Used when `[[watch.targets]]` is empty: content, templates, static files and
/// the project's TOML files.
pub fn default_targets(config: &Config) -> Vec<WatchTarget> {
    let all = "**/*".to_string();
    let mut targets = vec![
        WatchTarget { root: config.paths.content_dir.clone(), pattern: all.clone() },
        WatchTarget { root: config.paths.template_dir.clone(), pattern: all.clone() },
    ];
    if let Some(ref static_dir) = config.paths.static_dir {
        targets.push(WatchTarget { root: static_dir.clone(), pattern: all });
    }
    targets.push(WatchTarget { root: config.project_dir.clone(), pattern: "*.toml".to_string() });
    targets
}

pub fn watch_targets(config: &Config) -> Vec<WatchTarget> {
    if config.watch.targets.is_empty() {
        default_targets(config)
    } else {
        config.watch.targets.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::config::parse_config;
    use crate::test_data::CONFIG_DATA;

    use super::*;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn snapshot(entries: &[(&str, u64)]) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for (path, secs) in entries {
            snapshot.insert(PathBuf::from(path), at(*secs));
        }
        snapshot
    }

    /// Hands out queued snapshots, repeating the last one when the queue runs dry.
    struct FakeScanner {
        queue: VecDeque<Snapshot>,
        last: Snapshot,
    }

    impl FakeScanner {
        fn new(snapshots: Vec<Snapshot>) -> Self {
            FakeScanner { queue: snapshots.into(), last: Snapshot::default() }
        }
    }

    impl Scan for FakeScanner {
        fn scan(&mut self) -> Snapshot {
            if let Some(next) = self.queue.pop_front() {
                self.last = next;
            }
            self.last.clone()
        }
    }

    struct CountingRebuilder {
        runs: usize,
        outcomes: VecDeque<BuildOutcome>,
    }

    impl CountingRebuilder {
        fn new(outcomes: Vec<BuildOutcome>) -> Self {
            CountingRebuilder { runs: 0, outcomes: outcomes.into() }
        }
    }

    impl Rebuild for CountingRebuilder {
        fn rebuild(&mut self) -> BuildOutcome {
            self.runs += 1;
            self.outcomes.pop_front().unwrap_or(BuildOutcome::Succeeded)
        }
    }

    #[test]
    fn test_one_rebuild_per_change() {
        let scanner = FakeScanner::new(vec![
            snapshot(&[("f1", 100)]),
            snapshot(&[("f1", 100)]),
            snapshot(&[("f1", 150)]),
            snapshot(&[("f1", 150)]),
        ]);
        let mut watcher = Watcher::new(scanner, CountingRebuilder::new(vec![]), Duration::from_secs(2));
        let stop = AtomicBool::new(false);

        assert_eq!(watcher.poll(&stop), PollOutcome::Unchanged);
        assert_eq!(watcher.poll(&stop), PollOutcome::Rebuilt(BuildOutcome::Succeeded));
        assert_eq!(watcher.poll(&stop), PollOutcome::Unchanged);
        assert_eq!(watcher.rebuilder.runs, 1);
        assert_eq!(watcher.state(), WatchState::Idle);
        assert_eq!(watcher.snapshot(), &snapshot(&[("f1", 150)]));
    }

    #[test]
    fn test_continues_after_failed_build() {
        let scanner = FakeScanner::new(vec![
            snapshot(&[("f1", 100)]),
            snapshot(&[("f1", 100), ("f2", 100)]),
            snapshot(&[("f1", 100), ("f2", 100)]),
            snapshot(&[("f2", 100)]),
        ]);
        let rebuilder = CountingRebuilder::new(vec![BuildOutcome::Failed("exit status: 1".to_string())]);
        let mut watcher = Watcher::new(scanner, rebuilder, Duration::from_secs(2));
        let stop = AtomicBool::new(false);

        assert_eq!(watcher.poll(&stop), PollOutcome::Rebuilt(BuildOutcome::Failed("exit status: 1".to_string())));
        assert_eq!(watcher.poll(&stop), PollOutcome::Unchanged);
        assert_eq!(watcher.poll(&stop), PollOutcome::Rebuilt(BuildOutcome::Succeeded));
        assert_eq!(watcher.rebuilder.runs, 2);
    }

    /// Scanner that raises the stop flag while scanning, as Ctrl+C would.
    struct InterruptingScanner {
        stop: Arc<AtomicBool>,
        scans: usize,
    }

    impl Scan for InterruptingScanner {
        fn scan(&mut self) -> Snapshot {
            self.scans += 1;
            if self.scans > 1 {
                self.stop.store(true, Ordering::SeqCst);
            }
            snapshot(&[("f1", 100 + self.scans as u64)])
        }
    }

    #[test]
    fn test_stop_during_scan_skips_rebuild() {
        let stop = Arc::new(AtomicBool::new(false));
        let scanner = InterruptingScanner { stop: stop.clone(), scans: 0 };
        let mut watcher = Watcher::new(scanner, CountingRebuilder::new(vec![]), Duration::from_secs(2));

        assert_eq!(watcher.poll(&stop), PollOutcome::Stopped);
        assert_eq!(watcher.rebuilder.runs, 0);
        assert_eq!(watcher.state(), WatchState::Idle);

        watcher.run(&stop);
        assert_eq!(watcher.rebuilder.runs, 0);
    }

    #[test]
    fn test_run_returns_when_stopped() {
        let stop = AtomicBool::new(true);
        let mut watcher = Watcher::new(FakeScanner::new(vec![]), CountingRebuilder::new(vec![]), Duration::from_secs(60));
        watcher.run(&stop);
        assert_eq!(watcher.rebuilder.runs, 0);
    }

    #[test]
    fn test_sleep_interrupted() {
        let stop = AtomicBool::new(false);
        assert!(sleep_unless_stopped(Duration::from_millis(10), &stop));
        stop.store(true, Ordering::SeqCst);
        let start = Instant::now();
        assert!(!sleep_unless_stopped(Duration::from_secs(60), &stop));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_default_targets() {
        let cfg = parse_config(CONFIG_DATA, Path::new("/srv/blog")).unwrap();
        let targets = watch_targets(&cfg);
        let roots: Vec<_> = targets.iter().map(|t| t.root.clone()).collect();
        assert_eq!(roots, vec![
            PathBuf::from("/srv/blog/posts/markdown"),
            PathBuf::from("/srv/blog/templates"),
            PathBuf::from("/srv/blog/static"),
            PathBuf::from("/srv/blog"),
        ]);
        assert_eq!(targets[3].pattern, "*.toml");
    }
}
