//! Application Context
//!
//! Shared state handed to every board view.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::store::BoardCache;

/// Reference-counted scroll lock. Page scrolling stays locked while any
/// guard is alive (one per open modal).
#[derive(Clone, Default)]
pub struct ScrollLock {
    holders: Arc<AtomicUsize>,
}

impl ScrollLock {
    pub fn acquire(&self) -> ScrollGuard {
        if self.holders.fetch_add(1, Ordering::SeqCst) == 0 {
            tracing::debug!("scroll locked");
        }
        ScrollGuard { lock: self.clone() }
    }

    pub fn is_locked(&self) -> bool {
        self.holders() > 0
    }

    pub fn holders(&self) -> usize {
        self.holders.load(Ordering::SeqCst)
    }
}

/// Releases its hold on drop
#[must_use = "the scroll lock is released as soon as the guard is dropped"]
pub struct ScrollGuard {
    lock: ScrollLock,
}

impl Drop for ScrollGuard {
    fn drop(&mut self) {
        if self.lock.holders.fetch_sub(1, Ordering::SeqCst) == 1 {
            tracing::debug!("scroll unlocked");
        }
    }
}

/// App-wide state provided to board views
#[derive(Clone, Default)]
pub struct AppContext {
    pub cache: Arc<BoardCache>,
    pub scroll_lock: ScrollLock,
    /// Bumped whenever a view should reload from the backend
    reload_trigger: Arc<AtomicU32>,
}

impl AppContext {
    pub fn new(cache: Arc<BoardCache>) -> Self {
        Self {
            cache,
            ..Self::default()
        }
    }

    /// Trigger a reload of a board
    pub fn reload(&self, board_id: u32) {
        self.cache.invalidate(board_id);
        self.reload_trigger.fetch_add(1, Ordering::SeqCst);
    }

    pub fn reload_trigger(&self) -> u32 {
        self.reload_trigger.load(Ordering::SeqCst)
    }
}
