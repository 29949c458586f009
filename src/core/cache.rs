//! Resolved secret cache.
//!
//! Maps handles to plaintext for the lifetime of the owning service. Entries
//! are never evicted. Values are wiped from memory when the cache is dropped.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use zeroize::Zeroizing;

/// Handle to plaintext cache shared by every resolution in a process.
///
/// Callers take the lock for the whole lookup-fetch-store sequence via
/// [`HandleCache::lock`], so two concurrent resolutions never race to
/// fetch the same handle.
#[derive(Default)]
pub struct HandleCache {
    entries: Mutex<HashMap<String, Zeroizing<String>>>,
}

/// Exclusive access to the cache entries.
pub struct CacheGuard<'a> {
    entries: MutexGuard<'a, HashMap<String, Zeroizing<String>>>,
}

impl HandleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusive access to the cache.
    pub fn lock(&self) -> CacheGuard<'_> {
        // A panic in another resolution cannot leave a half-written entry,
        // so the data behind a poisoned lock is still valid.
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        CacheGuard { entries }
    }

    /// Number of cached handles.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached handle names, sorted. Values are never exposed here.
    pub fn handles(&self) -> Vec<String> {
        let mut handles: Vec<String> = self.lock().entries.keys().cloned().collect();
        handles.sort();
        handles
    }
}

impl CacheGuard<'_> {
    /// Look up a handle's plaintext.
    pub fn lookup(&self, handle: &str) -> Option<&str> {
        self.entries.get(handle).map(|v| v.as_str())
    }

    /// Store a resolved handle.
    pub fn store(&mut self, handle: String, plaintext: Zeroizing<String>) {
        self.entries.insert(handle, plaintext);
    }
}

impl std::fmt::Debug for HandleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleCache")
            .field("handles", &self.handles())
            .finish()
    }
}
