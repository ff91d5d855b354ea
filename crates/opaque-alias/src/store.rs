//! Bidirectional alias storage.
//!
//! The store keeps three maps in memory and mirrors each of them to its
//! own backend key as a JSON list of `[key, value]` pairs:
//!
//! - ids: real id → alias
//! - reverse: alias → real value, shared by ids and routes (route aliases
//!   are keyed without their leading `/`)
//! - routes: real route → route alias
//!
//! Memory is authoritative. Backend failures are logged and swallowed, and
//! the backend is only read again on an explicit [`MappingStore::reload`].

use crate::backend::KeyValueBackend;
use crate::config::StorageKeys;
use crate::error::{Result, StorageError};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type Pairs = BTreeMap<String, String>;

#[derive(Debug, Default)]
struct MappingState {
    ids: Pairs,
    reverse: Pairs,
    routes: Pairs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Record {
    Ids,
    Reverse,
    Routes,
}

const ID_RECORDS: &[Record] = &[Record::Ids, Record::Reverse];
const ALL_RECORDS: &[Record] = &[Record::Ids, Record::Reverse, Record::Routes];

/// Entry counts per map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MappingStats {
    pub ids: usize,
    pub reverse: usize,
    pub routes: usize,
}

pub struct MappingStore {
    backend: Arc<dyn KeyValueBackend>,
    keys: StorageKeys,
    state: RwLock<MappingState>,
}

impl fmt::Debug for MappingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingStore")
            .field("keys", &self.keys)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Reverse-map key for a route alias.
fn route_key(secure_route: &str) -> &str {
    secure_route.strip_prefix('/').unwrap_or(secure_route)
}

impl MappingStore {
    /// Creates a store and loads whatever the backend already holds.
    pub fn new(backend: Arc<dyn KeyValueBackend>, keys: StorageKeys) -> Self {
        let state = Self::load(backend.as_ref(), &keys);
        Self {
            backend,
            keys,
            state: RwLock::new(state),
        }
    }

    pub fn with_default_keys(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self::new(backend, StorageKeys::default())
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn store_id_mapping(&self, real_id: &str, secure_id: &str) {
        let mut state = self.state.write();
        state.ids.insert(real_id.to_string(), secure_id.to_string());
        state
            .reverse
            .insert(secure_id.to_string(), real_id.to_string());
        tracing::debug!(ids = state.ids.len(), "Stored id alias");
        self.persist(&state, ID_RECORDS);
    }

    pub fn store_route_mapping(&self, real_route: &str, secure_route: &str) {
        let mut state = self.state.write();
        state
            .routes
            .insert(real_route.to_string(), secure_route.to_string());
        state
            .reverse
            .insert(route_key(secure_route).to_string(), real_route.to_string());
        tracing::debug!(routes = state.routes.len(), "Stored route alias");
        self.persist(&state, ALL_RECORDS);
    }

    /// Returns the alias of `real_id`, minting and storing one with `mint`
    /// if there is none yet. The check and the insert happen under one lock.
    pub fn get_or_insert_id<F>(&self, real_id: &str, mint: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        let mut state = self.state.write();
        if let Some(existing) = state.ids.get(real_id) {
            return Ok(existing.clone());
        }
        let secure_id = mint()?;
        state.ids.insert(real_id.to_string(), secure_id.clone());
        state.reverse.insert(secure_id.clone(), real_id.to_string());
        tracing::debug!(ids = state.ids.len(), "Minted id alias");
        self.persist(&state, ID_RECORDS);
        Ok(secure_id)
    }

    /// Route counterpart of [`get_or_insert_id`](Self::get_or_insert_id).
    /// Nothing is written when the route already has an alias.
    pub fn get_or_insert_route<F>(&self, real_route: &str, mint: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        let mut state = self.state.write();
        if let Some(existing) = state.routes.get(real_route) {
            return Ok(existing.clone());
        }
        let secure_route = mint()?;
        state
            .routes
            .insert(real_route.to_string(), secure_route.clone());
        state
            .reverse
            .insert(route_key(&secure_route).to_string(), real_route.to_string());
        tracing::debug!(routes = state.routes.len(), "Minted route alias");
        self.persist(&state, ALL_RECORDS);
        Ok(secure_route)
    }

    pub fn get_secure_id_from_real(&self, real_id: &str) -> Option<String> {
        self.state.read().ids.get(real_id).cloned()
    }

    pub fn get_real_id_from_secure(&self, secure_id: &str) -> Option<String> {
        self.state.read().reverse.get(secure_id).cloned()
    }

    pub fn get_secure_route_from_real(&self, real_route: &str) -> Option<String> {
        self.state.read().routes.get(real_route).cloned()
    }

    /// Accepts the alias with or without its leading `/`.
    pub fn get_real_route_from_secure(&self, secure_route: &str) -> Option<String> {
        self.state
            .read()
            .reverse
            .get(route_key(secure_route))
            .cloned()
    }

    pub fn has_secure_id(&self, secure_id: &str) -> bool {
        self.state.read().reverse.contains_key(secure_id)
    }

    /// Forgets every id alias. Route aliases stay resolvable.
    pub fn reset_mappings(&self) {
        let mut state = self.state.write();
        let MappingState {
            ids,
            reverse,
            routes,
        } = &mut *state;
        ids.clear();
        reverse.clear();
        for (real_route, secure_route) in routes.iter() {
            reverse.insert(route_key(secure_route).to_string(), real_route.clone());
        }
        tracing::debug!(routes = state.routes.len(), "Reset id aliases");
        self.persist(&state, ALL_RECORDS);
    }

    /// Replaces in-memory state with what the backend currently holds.
    ///
    /// Writes made by other stores sharing the backend are only picked up
    /// here; nothing calls this implicitly.
    pub fn reload(&self) {
        let fresh = Self::load(self.backend.as_ref(), &self.keys);
        *self.state.write() = fresh;
    }

    pub fn stats(&self) -> MappingStats {
        let state = self.state.read();
        MappingStats {
            ids: state.ids.len(),
            reverse: state.reverse.len(),
            routes: state.routes.len(),
        }
    }

    fn key_for(&self, record: Record) -> &str {
        match record {
            Record::Ids => self.keys.id_mappings(),
            Record::Reverse => self.keys.reverse_mappings(),
            Record::Routes => self.keys.route_mappings(),
        }
    }

    fn persist(&self, state: &MappingState, records: &[Record]) {
        for &record in records {
            let pairs = match record {
                Record::Ids => &state.ids,
                Record::Reverse => &state.reverse,
                Record::Routes => &state.routes,
            };
            let key = self.key_for(record);
            if let Err(e) = self.write_record(key, pairs) {
                tracing::warn!(key, error = %e, "Failed to persist alias mappings");
            }
        }
    }

    fn write_record(&self, key: &str, pairs: &Pairs) -> std::result::Result<(), StorageError> {
        let list: Vec<(&String, &String)> = pairs.iter().collect();
        let encoded = serde_json::to_string(&list)?;
        self.backend.set(key, &encoded)
    }

    fn load(backend: &dyn KeyValueBackend, keys: &StorageKeys) -> MappingState {
        MappingState {
            ids: Self::load_record(backend, keys.id_mappings()),
            reverse: Self::load_record(backend, keys.reverse_mappings()),
            routes: Self::load_record(backend, keys.route_mappings()),
        }
    }

    fn load_record(backend: &dyn KeyValueBackend, key: &str) -> Pairs {
        let Some(raw) = backend.get(key) else {
            return Pairs::new();
        };
        match serde_json::from_str::<Vec<(String, String)>>(&raw) {
            Ok(list) => list.into_iter().collect(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable alias mappings");
                Pairs::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::{Error, OperationError};

    fn store() -> (Arc<MemoryBackend>, MappingStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = MappingStore::with_default_keys(backend.clone());
        (backend, store)
    }

    #[test]
    fn test_id_mapping_both_directions() {
        let (_, store) = store();
        assert_eq!(store.get_real_id_from_secure("product_abc_123"), None);

        store.store_id_mapping("p1", "product_abc_123");
        assert_eq!(
            store.get_secure_id_from_real("p1").as_deref(),
            Some("product_abc_123")
        );
        assert_eq!(
            store.get_real_id_from_secure("product_abc_123").as_deref(),
            Some("p1")
        );
        assert!(store.has_secure_id("product_abc_123"));
        assert!(!store.has_secure_id("product_zzz_123"));
    }

    #[test]
    fn test_route_mapping_strips_separator_in_reverse_map() {
        let (_, store) = store();
        store.store_route_mapping("/admin", "/xyz");

        assert_eq!(store.get_secure_route_from_real("/admin").as_deref(), Some("/xyz"));
        assert_eq!(store.get_real_route_from_secure("xyz").as_deref(), Some("/admin"));
        assert_eq!(store.get_real_route_from_secure("/xyz").as_deref(), Some("/admin"));
        assert!(store.has_secure_id("xyz"));
        assert!(!store.has_secure_id("/xyz"));
    }

    #[test]
    fn test_reset_preserves_routes() {
        let (_, store) = store();
        store.store_route_mapping("/admin", "/xyz");
        store.store_id_mapping("p1", "product_abc_123");

        store.reset_mappings();

        assert_eq!(store.get_real_id_from_secure("product_abc_123"), None);
        assert_eq!(store.get_secure_id_from_real("p1"), None);
        assert_eq!(store.get_real_route_from_secure("xyz").as_deref(), Some("/admin"));
        assert_eq!(
            store.stats(),
            MappingStats {
                ids: 0,
                reverse: 1,
                routes: 1
            }
        );
    }

    #[test]
    fn test_every_mutation_is_written_through() {
        let (backend, store) = store();
        store.store_id_mapping("p1", "product_abc_123");
        assert_eq!(
            backend.get("secureIdMappings").as_deref(),
            Some(r#"[["p1","product_abc_123"]]"#)
        );
        assert_eq!(
            backend.get("reverseIdMappings").as_deref(),
            Some(r#"[["product_abc_123","p1"]]"#)
        );
        // Id mappings alone do not touch the route record.
        assert_eq!(backend.get("secureRouteMappings"), None);

        store.store_route_mapping("/faq", "/q1");
        assert_eq!(
            backend.get("secureRouteMappings").as_deref(),
            Some(r#"[["/faq","/q1"]]"#)
        );
    }

    #[test]
    fn test_state_survives_a_new_store() {
        let (backend, store) = store();
        store.store_id_mapping("p1", "product_abc_123");
        store.store_route_mapping("/admin", "/xyz");

        let reopened = MappingStore::with_default_keys(backend);
        assert_eq!(
            reopened.get_real_id_from_secure("product_abc_123").as_deref(),
            Some("p1")
        );
        assert_eq!(reopened.get_real_route_from_secure("xyz").as_deref(), Some("/admin"));
    }

    #[test]
    fn test_corrupt_record_loads_empty() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_raw("secureIdMappings", "{not json");
        backend.insert_raw("secureRouteMappings", r#"[["/admin","/xyz"]]"#);

        let store = MappingStore::with_default_keys(backend);
        assert_eq!(store.stats().ids, 0);
        assert_eq!(store.get_secure_route_from_real("/admin").as_deref(), Some("/xyz"));
    }

    #[test]
    fn test_write_failure_keeps_memory_authoritative() {
        let (backend, store) = store();
        backend.fail_writes(true);

        store.store_id_mapping("p1", "product_abc_123");
        assert_eq!(
            store.get_real_id_from_secure("product_abc_123").as_deref(),
            Some("p1")
        );
        assert!(backend.is_empty());
    }

    #[test]
    fn test_get_or_insert_is_idempotent() {
        let (_, store) = store();
        let first = store
            .get_or_insert_route("/faq", || Ok("/one".to_string()))
            .unwrap();
        let second = store
            .get_or_insert_route("/faq", || Ok("/two".to_string()))
            .unwrap();
        assert_eq!(first, "/one");
        assert_eq!(second, "/one");

        let id = store
            .get_or_insert_id("p1", || Ok("product_a_1".to_string()))
            .unwrap();
        let again = store
            .get_or_insert_id("p1", || Ok("product_b_2".to_string()))
            .unwrap();
        assert_eq!(id, again);
        assert_eq!(store.stats().reverse, 2);
    }

    #[test]
    fn test_get_or_insert_propagates_mint_failure() {
        let (_, store) = store();
        let result = store.get_or_insert_id("p1", || {
            Err(Error::OperationFailed(OperationError::Generation(
                "no entropy".to_string(),
            )))
        });
        assert!(result.is_err());
        assert_eq!(store.get_secure_id_from_real("p1"), None);
    }

    #[test]
    fn test_reload_picks_up_foreign_writes() {
        let backend = Arc::new(MemoryBackend::new());
        let first = MappingStore::with_default_keys(backend.clone());
        let second = MappingStore::with_default_keys(backend);

        first.store_id_mapping("p1", "product_abc_123");
        assert!(!second.has_secure_id("product_abc_123"));

        second.reload();
        assert!(second.has_secure_id("product_abc_123"));
    }

    #[test]
    fn test_regenerating_without_lookup_leaves_stale_reverse_entry() {
        let (_, store) = store();
        store.store_id_mapping("p1", "product_old_1");
        store.store_id_mapping("p1", "product_new_2");

        assert_eq!(
            store.get_secure_id_from_real("p1").as_deref(),
            Some("product_new_2")
        );
        assert!(store.has_secure_id("product_old_1"));
    }
}
