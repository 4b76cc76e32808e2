use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use spdlog::warn;

use crate::config::WatchTarget;

/// Last known modification time of every watched file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub files: BTreeMap<PathBuf, SystemTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Added(PathBuf),
    Removed(PathBuf),
    Modified(PathBuf),
}

impl Snapshot {
    pub fn insert(&mut self, path: PathBuf, modified: SystemTime) {
        self.files.insert(path, modified);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Every difference between `self` (the previous scan) and `current`.
    pub fn diff(&self, current: &Snapshot) -> Vec<Change> {
        let mut changes = vec![];
        for (path, modified) in current.files.iter() {
            match self.files.get(path) {
                None => changes.push(Change::Added(path.clone())),
                Some(previous) if previous != modified => changes.push(Change::Modified(path.clone())),
                Some(_) => {}
            }
        }
        for path in self.files.keys() {
            if !current.files.contains_key(path) {
                changes.push(Change::Removed(path.clone()));
            }
        }
        changes
    }
}

/// Produces a fresh snapshot of the watched files.
pub trait Scan {
    fn scan(&mut self) -> Snapshot;
}

/// Expands `root/pattern` globs on every scan, so new files are picked up and
/// deleted ones drop out.
pub struct GlobScanner {
    patterns: Vec<String>,
}

impl GlobScanner {
    pub fn new(targets: &[WatchTarget]) -> Result<Self, glob::PatternError> {
        let mut patterns = Vec::with_capacity(targets.len());
        for target in targets {
            // the root is a literal path, only the pattern part is glob syntax
            let root = glob::Pattern::escape(&target.root.to_string_lossy());
            let pattern = format!("{}/{}", root.trim_end_matches('/'), target.pattern);
            glob::Pattern::new(&pattern)?;
            patterns.push(pattern);
        }
        Ok(GlobScanner { patterns })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    let metadata = fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }
    metadata.modified().ok()
}

impl Scan for GlobScanner {
    fn scan(&mut self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for pattern in self.patterns.iter() {
            let paths = match glob::glob(pattern) {
                Ok(paths) => paths,
                Err(e) => {
                    warn!("Invalid watch pattern {}: {}", pattern, e);
                    continue;
                }
            };
            // Entries that vanish or become unreadable mid-scan are left out.
            for path in paths.flatten() {
                if let Some(modified) = modified_time(&path) {
                    snapshot.insert(path, modified);
                }
            }
        }
        snapshot
    }
}
