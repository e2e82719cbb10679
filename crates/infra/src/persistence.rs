//! Collection ↔ key mapping and JSON (de)serialization over a [`KeyValueStore`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::kv::{KeyValueStore, StoreError};

/// A top-level persisted collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Inventory,
    FinalProducts,
    Orders,
    Tasks,
    Users,
    CompanyCatalogs,
    /// The signed-in user snapshot.
    Session,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Inventory,
        Collection::FinalProducts,
        Collection::Orders,
        Collection::Tasks,
        Collection::Users,
        Collection::CompanyCatalogs,
        Collection::Session,
    ];

    /// Storage key. These names are shared with data written by the dashboard.
    pub fn key(self) -> &'static str {
        match self {
            Collection::Inventory => "realprint_inventario",
            Collection::FinalProducts => "realprint_productos_finales",
            Collection::Orders => "realprint_pedidos",
            Collection::Tasks => "realprint_tareas",
            Collection::Users => "realprint_usuarios",
            Collection::CompanyCatalogs => "realprint_catalogos_empresa",
            Collection::Session => "realprint_user",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

/// Read and decode a collection. `Ok(None)` when the key is absent.
pub fn load<T, S>(store: &S, collection: Collection) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(collection.key())? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a whole collection.
pub fn save<T, S>(store: &S, collection: Collection, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(collection.key(), &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryKeyValueStore;

    #[test]
    fn keys_are_distinct() {
        let mut keys: Vec<&str> = Collection::ALL.iter().map(|c| c.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Collection::ALL.len());
    }

    #[test]
    fn save_then_load() {
        let store = InMemoryKeyValueStore::new();
        save(&store, Collection::Orders, &vec![1, 2, 3]).unwrap();
        let loaded: Option<Vec<i32>> = load(&store, Collection::Orders).unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));
        let missing: Option<Vec<i32>> = load(&store, Collection::Tasks).unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn corrupt_document_is_a_serialization_error() {
        let store = InMemoryKeyValueStore::new();
        store.set(Collection::Inventory.key(), "{not json").unwrap();
        let result: Result<Option<Vec<i32>>, _> = load(&store, Collection::Inventory);
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
