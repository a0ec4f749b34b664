//! Cache invalidation and redirect collaborators
//!
//! Mutations finish by telling the surrounding layer two things: which
//! rendered path is now stale, and where the user should go next. Both are
//! synchronous, fire-and-forget calls; the caller never waits on or checks
//! the effect.

use std::sync::Mutex;

use crate::core::cache::PageCache;
use crate::core::events::{EventBus, RevalidationEvent};

/// Receives the post-mutation signals
pub trait Navigator: Send + Sync {
    /// Mark cached content for `path` as stale
    fn revalidate_path(&self, path: &str);

    /// Send the user to `path` once the request completes
    fn redirect(&self, path: &str);
}

/// Navigator bound to one inbound request
///
/// Revalidation drops the page-cache entry and broadcasts a
/// [`RevalidationEvent`]. The redirect target is recorded for the HTTP
/// handler to turn into a response.
pub struct RequestNavigator {
    cache: PageCache,
    event_bus: EventBus,
    redirect_to: Mutex<Option<String>>,
}

impl RequestNavigator {
    pub fn new(cache: PageCache, event_bus: EventBus) -> Self {
        Self {
            cache,
            event_bus,
            redirect_to: Mutex::new(None),
        }
    }

    /// The last redirect requested during this request, if any
    pub fn take_redirect(&self) -> Option<String> {
        self.redirect_to.lock().ok()?.take()
    }
}

impl Navigator for RequestNavigator {
    fn revalidate_path(&self, path: &str) {
        let dropped = self.cache.invalidate(path);
        let receivers = self.event_bus.publish(RevalidationEvent::PathRevalidated {
            path: path.to_string(),
        });
        tracing::debug!(path, dropped, receivers, "path revalidated");
    }

    fn redirect(&self, path: &str) {
        if let Ok(mut target) = self.redirect_to.lock() {
            *target = Some(path.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_revalidate_drops_cache_and_publishes() {
        let cache = PageCache::new();
        cache.put("/dashboard/invoices", 0, json!([]));
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let navigator = RequestNavigator::new(cache.clone(), bus);
        navigator.revalidate_path("/dashboard/invoices");

        assert!(!cache.contains("/dashboard/invoices"));
        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event.path(), "/dashboard/invoices");
    }

    #[test]
    fn test_redirect_is_recorded_once() {
        let navigator = RequestNavigator::new(PageCache::new(), EventBus::new(8));
        assert_eq!(navigator.take_redirect(), None);

        navigator.redirect("/dashboard/invoices");
        assert_eq!(
            navigator.take_redirect().as_deref(),
            Some("/dashboard/invoices")
        );
        assert_eq!(navigator.take_redirect(), None);
    }
}
