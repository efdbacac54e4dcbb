//! Path-keyed cache of server-rendered views and its invalidation signal.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use log::info;

/// The page composing the three editable collections.
pub const PAGE_PATH: &str = "/";
/// Attendance view fed by clock events.
pub const ATTENDANCE_PATH: &str = "/asistencia";

/// Tells server-rendered views of `path` that their data changed.
pub trait Revalidate: Send + Sync {
    fn revalidate(&self, path: &str);
}

/// Revalidation target that drops every signal; used where no view is cached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl Revalidate for NoCache {
    fn revalidate(&self, _path: &str) {}
}

/// Rendered snapshots keyed by path.
///
/// Every invalidation bumps a generation counter. A value loaded before an
/// invalidation is not stored, so a slow load can never resurrect stale data.
pub struct RenderCache<T> {
    entries: RwLock<HashMap<String, T>>,
    generation: AtomicU64,
}

impl<T: Clone + Send + Sync> RenderCache<T> {
    pub fn new() -> Self {
        RenderCache {
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn get(&self, path: &str) -> Option<T> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Stores `value` unless an invalidation happened since `generation` was read.
    pub fn put_if_current(&self, path: &str, value: T, generation: u64) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation() != generation {
            return false;
        }
        entries.insert(path.to_string(), value);
        true
    }
}

impl<T: Clone + Send + Sync> Default for RenderCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> Revalidate for RenderCache<T> {
    fn revalidate(&self, path: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::AcqRel);
        if entries.remove(path).is_some() {
            info!("Revalidated cached view at {}", path);
        }
    }
}
