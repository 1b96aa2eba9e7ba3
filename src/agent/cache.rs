// ABOUTME: ToolCache - remembers successful tool results by (tool, arguments)
// ABOUTME: so cache-enabled agents do not repeat identical lookups.

use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;

use crate::tool::ToolResult;

/// Entries kept before the oldest is evicted.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

type Key = (String, String);

#[derive(Default)]
struct Entries {
    results: HashMap<Key, ToolResult>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<Key>,
}

/// Shared cache of successful tool results, bounded to `capacity` entries.
///
/// Arguments are keyed by their serialized JSON; object keys serialize in
/// sorted order so logically equal arguments share an entry. When full, the
/// oldest entry is dropped.
pub struct ToolCache {
    entries: RwLock<Entries>,
    capacity: usize,
}

impl Default for ToolCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ToolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` results. Zero disables storage.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn key(tool: &str, input: &serde_json::Value) -> Key {
        (tool.to_string(), input.to_string())
    }

    /// Look up a previous result.
    pub async fn get(&self, tool: &str, input: &serde_json::Value) -> Option<ToolResult> {
        self.entries
            .read()
            .await
            .results
            .get(&Self::key(tool, input))
            .cloned()
    }

    /// Store a result. Error results are never cached.
    pub async fn insert(&self, tool: &str, input: &serde_json::Value, result: &ToolResult) {
        if result.is_error || self.capacity == 0 {
            return;
        }
        let key = Self::key(tool, input);
        let mut entries = self.entries.write().await;
        if entries.results.insert(key.clone(), result.clone()).is_some() {
            return;
        }
        entries.order.push_back(key);
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.results.remove(&oldest);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.results.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.results.is_empty()
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.results.clear();
        entries.order.clear();
    }
}
