//! Snapshot maps for persisting and resuming client state.
//!
//! Every entity converts to and from a `serde_json` object whose keys are
//! the entity's field names. Nested entities become nested objects and
//! `char` lists become lists of one-character strings. The only contract is
//! round-trip fidelity: `T::from_map(x.to_map()?)? == x`.
//!
//! Ids for remote references are handed out by a [`SnapshotRegistry`] owned
//! by the caller; nothing here is global.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::SnapshotError;

/// Key under which a registry stores an entity id inside its map.
pub const ID_KEY: &str = "rpc_id";

/// Conversion between an entity and its snapshot map.
pub trait Snapshot: Serialize + DeserializeOwned {
    /// Short entity name used in diagnostics and registry bookkeeping.
    const KIND: &'static str;

    fn to_map(&self) -> Result<Map<String, Value>, SnapshotError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(SnapshotError::NotAMap(Self::KIND)),
        }
    }

    fn from_map(map: Map<String, Value>) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_value(Value::Object(map))?)
    }
}

/// Caller-owned id allocator for snapshot maps.
///
/// Ids are unique per registry. Loading a map that already carries an id
/// records it and moves the counter past it, so later allocations never
/// collide with restored entities.
#[derive(Debug, Default)]
pub struct SnapshotRegistry {
    next_id: u64,
    kinds: HashMap<u64, &'static str>,
}

impl SnapshotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id for an entity of kind `kind`.
    pub fn allocate(&mut self, kind: &'static str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.kinds.insert(id, kind);
        id
    }

    /// Snapshot `item` and tag the map with a newly allocated id.
    pub fn export<T: Snapshot>(&mut self, item: &T) -> Result<(u64, Map<String, Value>), SnapshotError> {
        let mut map = item.to_map()?;
        let id = self.allocate(T::KIND);
        map.insert(ID_KEY.to_string(), Value::from(id));
        Ok((id, map))
    }

    /// Restore an entity from a map, recording the id it carries.
    ///
    /// Maps without an id are restored as-is and get `None`.
    pub fn import<T: Snapshot>(&mut self, mut map: Map<String, Value>) -> Result<(Option<u64>, T), SnapshotError> {
        let id = match map.remove(ID_KEY) {
            Some(value) => Some(value.as_u64().ok_or_else(|| SnapshotError::InvalidValue {
                field: ID_KEY,
                reason: format!("expected unsigned integer, got {}", value),
            })?),
            None => None,
        };
        let item = T::from_map(map)?;
        if let Some(id) = id {
            self.kinds.insert(id, T::KIND);
            self.next_id = self.next_id.max(id + 1);
        }
        Ok((id, item))
    }

    /// Forget an id, e.g. when the entity it named was destroyed.
    pub fn release(&mut self, id: u64) -> bool {
        self.kinds.remove(&id).is_some()
    }

    /// Kind of the entity registered under `id`.
    pub fn kind_of(&self, id: u64) -> Option<&'static str> {
        self.kinds.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::User;

    #[test]
    fn test_registry_ids_are_sequential() {
        let mut registry = SnapshotRegistry::new();
        let user = User::from_source("a!b@c");
        let (first, map) = registry.export(&user).unwrap();
        let (second, _) = registry.export(&user).unwrap();
        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(map.get(ID_KEY), Some(&Value::from(0u64)));
        assert_eq!(registry.kind_of(1), Some("user"));
    }

    #[test]
    fn test_import_advances_counter() {
        let mut source = SnapshotRegistry::new();
        let user = User::from_source("a!b@c");
        source.allocate("user");
        source.allocate("user");
        let (id, map) = source.export(&user).unwrap();
        assert_eq!(id, 2);

        let mut target = SnapshotRegistry::new();
        let (restored_id, restored): (_, User) = target.import(map).unwrap();
        assert_eq!(restored_id, Some(2));
        assert_eq!(restored, user);
        assert_eq!(target.allocate("user"), 3);
    }

    #[test]
    fn test_import_rejects_bad_id() {
        let mut registry = SnapshotRegistry::new();
        let mut map = User::with_nick("x").to_map().unwrap();
        map.insert(ID_KEY.to_string(), Value::from("seven"));
        let err = registry.import::<User>(map).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidValue { field: ID_KEY, .. }));
    }

    #[test]
    fn test_chars_become_strings() {
        let mut user = User::with_nick("x");
        user.channel_user_modes = vec!['o'];
        let map = user.to_map().unwrap();
        assert_eq!(map["channel_user_modes"], serde_json::json!(["o"]));
    }

    #[test]
    fn test_release() {
        let mut registry = SnapshotRegistry::new();
        let id = registry.allocate("channel");
        assert!(registry.release(id));
        assert!(!registry.release(id));
        assert!(registry.is_empty());
    }
}
