//! Rendered-page cache keyed by path

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct Slot {
    /// Bumped on every invalidation of the path
    generation: u64,
    page: Option<Value>,
}

/// Snapshots of read responses, dropped when their path is revalidated
///
/// A reader records [`generation`](Self::generation) before it loads a page
/// and hands it back to [`put`](Self::put). If the path was invalidated in
/// between, the page is already stale and is not stored.
///
/// A poisoned lock degrades to a cache miss; the cache never fails a request.
#[derive(Clone, Default)]
pub struct PageCache {
    slots: Arc<RwLock<HashMap<String, Slot>>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.slots.read().ok()?.get(path)?.page.clone()
    }

    /// Current invalidation count for `path`
    pub fn generation(&self, path: &str) -> u64 {
        self.slots
            .read()
            .ok()
            .and_then(|slots| slots.get(path).map(|slot| slot.generation))
            .unwrap_or(0)
    }

    /// Store `page` if `path` has not been invalidated since `generation`
    ///
    /// Returns whether the page was stored.
    pub fn put(&self, path: &str, generation: u64, page: Value) -> bool {
        let Ok(mut slots) = self.slots.write() else {
            return false;
        };
        let slot = slots.entry(path.to_string()).or_default();
        if slot.generation != generation {
            tracing::debug!(path, "discarding page read before revalidation");
            return false;
        }
        slot.page = Some(page);
        true
    }

    /// Drop the snapshot for `path` and start a new generation; returns
    /// whether a snapshot existed
    pub fn invalidate(&self, path: &str) -> bool {
        self.slots
            .write()
            .map(|mut slots| {
                let slot = slots.entry(path.to_string()).or_default();
                slot.generation += 1;
                slot.page.take().is_some()
            })
            .unwrap_or(false)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.slots
            .read()
            .map(|slots| slots.get(path).is_some_and(|slot| slot.page.is_some()))
            .unwrap_or(false)
    }
}
