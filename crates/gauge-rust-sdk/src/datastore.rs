//! Suite, spec and scenario scoped data stores
//!
//! Hooks and steps share state through these stores. Gauge resets each store
//! at the start of its scope with a `*DataStoreInit` message.
//!
//! ```ignore
//! use gauge_rust_sdk::datastore;
//!
//! datastore::scenario().put("user_id", json!(42));
//! let id = datastore::scenario().get("user_id");
//! ```

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde_json::Value as JsonValue;

/// Which store a data store init message targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataStoreScope {
    Suite,
    Spec,
    Scenario,
}

/// A concurrent key/value store of JSON values
#[derive(Debug, Default)]
pub struct DataStore {
    entries: DashMap<String, JsonValue>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: impl Into<String>, value: JsonValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<JsonValue> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    pub fn remove(&self, key: &str) -> Option<JsonValue> {
        self.entries.remove(key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

static SUITE_STORE: Lazy<DataStore> = Lazy::new(DataStore::new);
static SPEC_STORE: Lazy<DataStore> = Lazy::new(DataStore::new);
static SCENARIO_STORE: Lazy<DataStore> = Lazy::new(DataStore::new);

/// Store that lives for the whole suite run
pub fn suite() -> &'static DataStore {
    &SUITE_STORE
}

/// Store reset before every spec
pub fn spec() -> &'static DataStore {
    &SPEC_STORE
}

/// Store reset before every scenario
pub fn scenario() -> &'static DataStore {
    &SCENARIO_STORE
}

/// The process-wide store for a scope.
pub fn store(scope: DataStoreScope) -> &'static DataStore {
    match scope {
        DataStoreScope::Suite => suite(),
        DataStoreScope::Spec => spec(),
        DataStoreScope::Scenario => scenario(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_get_clear() {
        let store = DataStore::new();
        assert!(store.is_empty());

        store.put("user", json!({"name": "alice"}));
        store.put("count", json!(3));
        assert_eq!(store.get("count"), Some(json!(3)));
        assert_eq!(store.len(), 2);

        assert_eq!(store.remove("count"), Some(json!(3)));
        store.clear();
        assert!(store.get("user").is_none());
    }
}
