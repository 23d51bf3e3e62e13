//! Scoped key/value collections backing the location and sample stores.
//!
//! The engine never assumes a storage engine. It needs one [`Collection`] per
//! entity kind, partitioned by a [`Scope`], offering insert, fetch-by-id,
//! fetch-all-in-scope, update-in-place and delete-by-id. Each call is atomic for
//! the single entity it touches; nothing spans entities.
//!
//! [`MemoryCollection`] is the bundled backend. It can be captured into a
//! [`Snapshot`] and encoded with `bincode`, which is how the command line tool
//! keeps its data between runs.

use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Partition key grouping the entities of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope(String);

impl Scope {
    /// Creates a scope from its key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The scope key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scoped key/value collection of one entity kind.
///
/// Methods take `&self` so one collection can serve concurrent callers.
pub trait Collection<T>: Send + Sync {
    /// Partition this collection reads and writes.
    fn scope(&self) -> &Scope;

    /// Reserves a fresh identifier. Identifiers are never reused.
    fn next_id(&self) -> StoreResult<u64>;

    /// Stores `value` under `id`, replacing any previous value.
    fn insert(&self, id: u64, value: T) -> StoreResult<()>;

    /// Fetches the value stored under `id`.
    fn get(&self, id: u64) -> StoreResult<Option<T>>;

    /// Fetches every value in scope, ordered by identifier.
    fn all(&self) -> StoreResult<Vec<T>>;

    /// Modifies the value under `id` in place and returns the result.
    ///
    /// Returns `None` if nothing was stored there. The read and the write happen
    /// atomically with respect to other calls on the same entity.
    fn update(&self, id: u64, apply: &mut dyn FnMut(&mut T)) -> StoreResult<Option<T>>;

    /// Removes the value under `id`. Returns `false` if nothing was stored there.
    fn delete(&self, id: u64) -> StoreResult<bool>;
}

/// In-process [`Collection`] backed by a hash map.
pub struct MemoryCollection<T> {
    scope: Scope,
    next_id: AtomicU64,
    records: RwLock<FxHashMap<u64, T>>,
}

/// Serializable image of a [`MemoryCollection`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<T> {
    /// Scope the records were taken from
    pub scope: Scope,
    /// Next identifier the collection would hand out
    pub next_id: u64,
    /// Stored records keyed by identifier, ascending
    pub records: Vec<(u64, T)>,
}

impl<T: Clone> MemoryCollection<T> {
    /// Creates an empty collection. Identifiers start at 1.
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            next_id: AtomicU64::new(1),
            records: RwLock::new(FxHashMap::default()),
        }
    }

    /// Rebuilds a collection from a snapshot taken in the same scope.
    pub fn restore(scope: Scope, snapshot: Snapshot<T>) -> StoreResult<Self> {
        if snapshot.scope != scope {
            return Err(StoreError::ScopeMismatch {
                expected: scope.0,
                found: snapshot.scope.0,
            });
        }

        let next_id = snapshot
            .records
            .iter()
            .map(|(id, _)| id.saturating_add(1))
            .max()
            .unwrap_or(1)
            .max(snapshot.next_id);

        Ok(Self {
            scope,
            next_id: AtomicU64::new(next_id),
            records: RwLock::new(snapshot.records.into_iter().collect()),
        })
    }

    /// Captures the current contents.
    pub fn snapshot(&self) -> Snapshot<T> {
        let records = self.records.read();
        let mut entries: Vec<(u64, T)> = records
            .iter()
            .map(|(&id, value)| (id, value.clone()))
            .collect();
        entries.sort_unstable_by_key(|(id, _)| *id);

        Snapshot {
            scope: self.scope.clone(),
            next_id: self.next_id.load(Ordering::SeqCst),
            records: entries,
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<T: Clone + Send + Sync> Collection<T> for MemoryCollection<T> {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn next_id(&self) -> StoreResult<u64> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn insert(&self, id: u64, value: T) -> StoreResult<()> {
        self.records.write().insert(id, value);
        Ok(())
    }

    fn get(&self, id: u64) -> StoreResult<Option<T>> {
        Ok(self.records.read().get(&id).cloned())
    }

    fn all(&self) -> StoreResult<Vec<T>> {
        let records = self.records.read();
        let mut ids: Vec<u64> = records.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }

    fn update(&self, id: u64, apply: &mut dyn FnMut(&mut T)) -> StoreResult<Option<T>> {
        let mut records = self.records.write();
        Ok(records.get_mut(&id).map(|slot| {
            apply(slot);
            slot.clone()
        }))
    }

    fn delete(&self, id: u64) -> StoreResult<bool> {
        Ok(self.records.write().remove(&id).is_some())
    }
}

/// Encodes a value with the standard `bincode` configuration.
pub fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    Ok(bincode::serde::encode_to_vec(
        value,
        bincode::config::standard(),
    )?)
}

/// Decodes a value produced by [`encode`].
pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    let (value, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> MemoryCollection<String> {
        MemoryCollection::new(Scope::new("*test*"))
    }

    #[test]
    fn ids_are_monotonic() {
        let c = collection();
        let a = c.next_id().unwrap();
        let b = c.next_id().unwrap();
        assert_eq!(a, 1);
        assert!(b > a);
    }

    #[test]
    fn update_and_delete_report_absence() {
        let c = collection();
        assert!(c.update(9, &mut |v| v.push('!')).unwrap().is_none());
        assert!(!c.delete(9).unwrap());

        c.insert(9, "x".into()).unwrap();
        let updated = c.update(9, &mut |v| v.push('!')).unwrap();
        assert_eq!(updated.as_deref(), Some("x!"));
        assert_eq!(c.get(9).unwrap().as_deref(), Some("x!"));
        assert!(c.delete(9).unwrap());
        assert!(c.get(9).unwrap().is_none());
    }

    #[test]
    fn all_is_ordered_by_id() {
        let c = collection();
        for id in [5, 2, 8] {
            c.insert(id, id.to_string()).unwrap();
        }
        assert_eq!(c.all().unwrap(), vec!["2", "5", "8"]);
    }

    #[test]
    fn snapshot_survives_encoding() {
        let c = collection();
        let id = c.next_id().unwrap();
        c.insert(id, "dark".into()).unwrap();

        let bytes = encode(&c.snapshot()).unwrap();
        let snapshot: Snapshot<String> = decode(&bytes).unwrap();
        let restored = MemoryCollection::restore(Scope::new("*test*"), snapshot).unwrap();

        assert_eq!(restored.get(id).unwrap().as_deref(), Some("dark"));
        assert!(restored.next_id().unwrap() > id);
    }

    #[test]
    fn restore_tolerates_maximal_id() {
        let snapshot = Snapshot {
            scope: Scope::new("*test*"),
            next_id: 0,
            records: vec![(u64::MAX, "edge".to_string())],
        };
        let restored = MemoryCollection::restore(Scope::new("*test*"), snapshot).unwrap();
        assert_eq!(restored.get(u64::MAX).unwrap().as_deref(), Some("edge"));
    }

    #[test]
    fn restore_rejects_foreign_scope() {
        let snapshot = collection().snapshot();
        let err = MemoryCollection::restore(Scope::new("*other*"), snapshot).err();
        assert!(matches!(err, Some(StoreError::ScopeMismatch { .. })));
    }
}
