//! Client-side query cache.
//!
//! Cached results are keyed by [`QueryKey`]: a procedure family, the query
//! kind (plain or infinite) and an optional input. A key without input acts
//! as a prefix and matches every cached entry of its family and kind, which
//! is how mutations invalidate "all document details" without knowing ids.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value as JsonValue;
use tracing::debug;

/// A procedure whose results the dashboard caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryFamily {
    DocumentsGet,
    DocumentsGetById,
    DocumentTagsGet,
    InboxGet,
    InboxGetById,
    InboxSearch,
    UserMe,
}

impl QueryFamily {
    /// Dotted procedure path, e.g. `documents.getById`.
    pub fn path(self) -> &'static str {
        match self {
            QueryFamily::DocumentsGet => "documents.get",
            QueryFamily::DocumentsGetById => "documents.getById",
            QueryFamily::DocumentTagsGet => "documentTags.get",
            QueryFamily::InboxGet => "inbox.get",
            QueryFamily::InboxGetById => "inbox.getById",
            QueryFamily::InboxSearch => "inbox.search",
            QueryFamily::UserMe => "user.me",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Query,
    /// Paged query that accumulates pages under one key.
    Infinite,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub family: QueryFamily,
    pub kind: QueryKind,
    pub input: Option<String>,
}

impl QueryKey {
    pub fn query(family: QueryFamily) -> Self {
        Self {
            family,
            kind: QueryKind::Query,
            input: None,
        }
    }

    pub fn infinite(family: QueryFamily) -> Self {
        Self {
            family,
            kind: QueryKind::Infinite,
            input: None,
        }
    }

    /// Narrow the key to a single input (usually an id).
    pub fn with_input(mut self, input: impl ToString) -> Self {
        self.input = Some(input.to_string());
        self
    }

    /// Whether `self`, used as a prefix, covers `other`.
    pub fn matches(&self, other: &QueryKey) -> bool {
        self.family == other.family
            && self.kind == other.kind
            && match &self.input {
                Some(input) => other.input.as_ref() == Some(input),
                None => true,
            }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family.path())?;
        if self.kind == QueryKind::Infinite {
            f.write_str("[infinite]")?;
        }
        if let Some(input) = &self.input {
            write!(f, "({})", input)?;
        }
        Ok(())
    }
}

/// What a successful mutation marks stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Keys(Vec<QueryKey>),
    /// Every cached query, e.g. after switching teams.
    All,
}

impl Invalidation {
    pub fn none() -> Self {
        Invalidation::Keys(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Invalidation::Keys(keys) if keys.is_empty())
    }
}

struct Entry {
    data: JsonValue,
    stale: bool,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
    log: Vec<Invalidation>,
}

/// Shared cache of query results with an invalidation log.
#[derive(Default)]
pub struct QueryCache {
    state: Mutex<CacheState>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a fresh result for `key`.
    pub fn set(&self, key: QueryKey, data: JsonValue) {
        self.state()
            .entries
            .insert(key, Entry { data, stale: false });
    }

    pub fn get(&self, key: &QueryKey) -> Option<JsonValue> {
        self.state().entries.get(key).map(|e| e.data.clone())
    }

    /// Missing entries count as stale.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.state().entries.get(key).map_or(true, |e| e.stale)
    }

    /// Mark every entry covered by `key` stale.
    pub fn invalidate(&self, key: &QueryKey) -> usize {
        self.apply(&Invalidation::Keys(vec![key.clone()]))
    }

    pub fn invalidate_all(&self) -> usize {
        self.apply(&Invalidation::All)
    }

    /// Apply an invalidation and record it in the log. Returns the number of
    /// entries marked stale. An empty invalidation is not logged.
    pub fn apply(&self, invalidation: &Invalidation) -> usize {
        if invalidation.is_empty() {
            return 0;
        }
        let mut state = self.state();
        let mut marked = 0;
        for (key, entry) in state.entries.iter_mut() {
            let hit = match invalidation {
                Invalidation::All => true,
                Invalidation::Keys(prefixes) => prefixes.iter().any(|p| p.matches(key)),
            };
            if hit {
                entry.stale = true;
                marked += 1;
            }
        }
        state.log.push(invalidation.clone());
        debug!(
            subsystem = "dashboard",
            component = "query_cache",
            op = "invalidate",
            marked,
            "Queries invalidated"
        );
        marked
    }

    /// Every invalidation applied so far, oldest first.
    pub fn invalidations(&self) -> Vec<Invalidation> {
        self.state().log.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefix_key_matches_all_inputs() {
        let prefix = QueryKey::query(QueryFamily::DocumentsGetById);
        let one = QueryKey::query(QueryFamily::DocumentsGetById).with_input("a");
        let other_family = QueryKey::query(QueryFamily::InboxGetById).with_input("a");
        assert!(prefix.matches(&one));
        assert!(!prefix.matches(&other_family));
        assert!(!one.matches(&prefix));
    }

    #[test]
    fn test_infinite_key_only_matches_infinite() {
        let infinite = QueryKey::infinite(QueryFamily::DocumentsGet);
        let plain = QueryKey::query(QueryFamily::DocumentsGet);
        assert!(!infinite.matches(&plain));
        assert!(infinite.matches(&QueryKey::infinite(QueryFamily::DocumentsGet).with_input("p")));
    }

    #[test]
    fn test_display() {
        let key = QueryKey::infinite(QueryFamily::DocumentsGet).with_input(3);
        assert_eq!(key.to_string(), "documents.get[infinite](3)");
        assert_eq!(QueryKey::query(QueryFamily::UserMe).to_string(), "user.me");
    }

    #[test]
    fn test_invalidate_marks_only_covered_entries() {
        let cache = QueryCache::new();
        let doc = QueryKey::query(QueryFamily::DocumentsGetById).with_input("d1");
        let me = QueryKey::query(QueryFamily::UserMe);
        cache.set(doc.clone(), json!({ "id": "d1" }));
        cache.set(me.clone(), json!({ "id": "u1" }));

        let marked = cache.invalidate(&QueryKey::query(QueryFamily::DocumentsGetById));
        assert_eq!(marked, 1);
        assert!(cache.is_stale(&doc));
        assert!(!cache.is_stale(&me));
        assert_eq!(cache.get(&doc), Some(json!({ "id": "d1" })));
    }

    #[test]
    fn test_invalidate_all_and_log() {
        let cache = QueryCache::new();
        cache.set(QueryKey::query(QueryFamily::UserMe), json!(null));
        cache.set(QueryKey::query(QueryFamily::InboxGet), json!([]));

        assert_eq!(cache.invalidate_all(), 2);
        assert_eq!(cache.invalidations(), vec![Invalidation::All]);
        assert!(cache.is_stale(&QueryKey::query(QueryFamily::InboxGet)));
    }

    #[test]
    fn test_empty_invalidation_is_not_logged() {
        let cache = QueryCache::new();
        cache.set(QueryKey::query(QueryFamily::UserMe), json!(null));

        assert_eq!(cache.apply(&Invalidation::none()), 0);
        assert!(cache.invalidations().is_empty());
        assert!(!cache.is_stale(&QueryKey::query(QueryFamily::UserMe)));
    }

    #[test]
    fn test_missing_entry_is_stale() {
        let cache = QueryCache::new();
        assert!(cache.is_stale(&QueryKey::query(QueryFamily::UserMe)));
        assert!(Invalidation::none().is_empty());
        assert!(!Invalidation::All.is_empty());
    }
}
