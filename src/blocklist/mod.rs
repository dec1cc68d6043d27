//! Disposable-domain blocklist.
//!
//! The store is the only state shared across verification requests. Readers
//! take an [`Arc`] snapshot of the whole set; a refresh builds a new set and
//! swaps the reference, so a reader always sees either the old complete set
//! or the new complete set, never a partial merge.

#[cfg(feature = "with-refresh")]
pub mod refresh;

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Shared handle to the disposable-domain set. Cloning is cheap and all
/// clones observe the same underlying set.
#[derive(Debug, Clone, Default)]
pub struct BlocklistStore {
    inner: Arc<RwLock<Arc<HashSet<String>>>>,
}

impl BlocklistStore {
    /// An empty store; domains arrive later via [`replace`](Self::replace)
    /// or a refresh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store from a text blob, one domain per line. Blank lines
    /// and `#` comments are skipped.
    pub fn from_lines(text: &str) -> Self {
        let store = Self::new();
        store.replace(parse_lines(text));
        store
    }

    /// Case-insensitive membership test against the current snapshot.
    pub fn contains(&self, domain: &str) -> bool {
        self.snapshot().contains(&domain.to_ascii_lowercase())
    }

    /// The current complete set. The snapshot stays valid (and unchanged)
    /// even if a refresh swaps in a new set concurrently.
    pub fn snapshot(&self) -> Arc<HashSet<String>> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replaces the whole set atomically.
    pub fn replace(&self, domains: HashSet<String>) {
        let fresh = Arc::new(domains);
        match self.inner.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

pub(crate) fn parse_lines(text: &str) -> HashSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_ascii_lowercase)
        .collect()
}
