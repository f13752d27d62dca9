//! In-memory entry store: the single source of truth for avatar grants.
//!
//! Every key present holds at least one real avatar. Mutation is crate-private
//! so that only the mutator and the legacy migration change grants.

use std::collections::HashMap;

use avatarium_types::avatar::AvatarId;
use avatarium_types::entry::AvatarEntry;
use avatarium_types::record::{EntryRecord, StoreSnapshot};
use avatarium_types::user::UserId;

/// Mapping from user id to that user's grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryStore {
    entries: HashMap<UserId, AvatarEntry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from its durable snapshot.
    ///
    /// Records with no real avatar are dropped; their keys are returned so
    /// the caller can report them.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> (Self, Vec<String>) {
        let mut store = Self::new();
        let mut dropped = Vec::new();
        for (key, record) in snapshot {
            let user = UserId::normalize(&key);
            match record.into_entry() {
                Some(entry) if !user.is_empty() => {
                    match store.entries.get_mut(&user) {
                        // Two raw keys normalizing to the same id
                        Some(existing) => existing.absorb(entry),
                        None => {
                            store.entries.insert(user, entry);
                        }
                    }
                }
                _ => dropped.push(key),
            }
        }
        (store, dropped)
    }

    /// Durable form of the whole store.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.entries
            .iter()
            .map(|(user, entry)| (user.to_string(), EntryRecord::from(entry)))
            .collect()
    }

    pub fn get(&self, user: &UserId) -> Option<&AvatarEntry> {
        self.entries.get(user)
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.entries.contains_key(user)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries sorted by user id.
    pub fn iter_sorted(&self) -> Vec<(&UserId, &AvatarEntry)> {
        let mut all: Vec<_> = self.entries.iter().collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all
    }

    /// Users holding `avatar`, sorted.
    pub fn holders_of(&self, avatar: &AvatarId) -> Vec<&UserId> {
        let mut users: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.contains(avatar))
            .map(|(user, _)| user)
            .collect();
        users.sort();
        users
    }

    pub(crate) fn get_mut(&mut self, user: &UserId) -> Option<&mut AvatarEntry> {
        self.entries.get_mut(user)
    }

    /// Entry for `user`, created empty if missing. Callers must leave it
    /// non-empty or call [`EntryStore::prune`].
    pub(crate) fn entry_mut(&mut self, user: &UserId) -> &mut AvatarEntry {
        self.entries
            .entry(user.clone())
            .or_insert_with(AvatarEntry::empty)
    }

    pub(crate) fn insert(&mut self, user: UserId, entry: AvatarEntry) {
        if entry.is_empty() {
            self.entries.remove(&user);
        } else {
            self.entries.insert(user, entry);
        }
    }

    pub(crate) fn take(&mut self, user: &UserId) -> Option<AvatarEntry> {
        self.entries.remove(user)
    }

    /// Delete the entry for `user` if it holds no real avatar. Returns true if deleted.
    pub(crate) fn prune(&mut self, user: &UserId) -> bool {
        if self.entries.get(user).is_some_and(AvatarEntry::is_empty) {
            self.entries.remove(user);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(json: serde_json::Value) -> StoreSnapshot {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_from_snapshot_drops_empty_records() {
        let (store, dropped) = EntryStore::from_snapshot(snapshot(serde_json::json!({
            "alice": {"allowed": ["#alice"]},
            "bob": {"allowed": [null]},
            "!!!": {"allowed": ["#x"]},
        })));
        assert_eq!(store.len(), 1);
        assert!(store.contains(&UserId::normalize("alice")));
        assert_eq!(dropped.len(), 2);
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let (store, _) = EntryStore::from_snapshot(snapshot(serde_json::json!({
            "alice": {"allowed": [null, "#group", "alice.png"], "default": "alice.png"},
        })));
        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "alice": {"allowed": [null, "#group", "alice.png"], "default": "alice.png"}
            })
        );
    }

    #[test]
    fn test_from_snapshot_merges_keys_that_normalize_together() {
        let (store, dropped) = EntryStore::from_snapshot(snapshot(serde_json::json!({
            "Alice": {"allowed": ["#a"]},
            "alice": {"allowed": ["#b"]},
        })));
        assert!(dropped.is_empty());
        assert_eq!(store.get(&UserId::normalize("alice")).unwrap().len(), 2);
    }

    #[test]
    fn test_prune_only_removes_empty() {
        let mut store = EntryStore::new();
        let user = UserId::normalize("alice");
        store.entry_mut(&user).push_extra(AvatarId::normalize("#a"));
        assert!(!store.prune(&user));

        store.get_mut(&user).unwrap().remove(&AvatarId::normalize("#a"));
        assert!(store.prune(&user));
        assert!(store.is_empty());
    }

    #[test]
    fn test_holders_of() {
        let (store, _) = EntryStore::from_snapshot(snapshot(serde_json::json!({
            "bob": {"allowed": [null, "#cup"]},
            "alice": {"allowed": ["#a", "#cup"]},
            "carol": {"allowed": ["#c"]},
        })));
        let holders: Vec<&str> = store
            .holders_of(&AvatarId::normalize("#cup"))
            .into_iter()
            .map(UserId::as_str)
            .collect();
        assert_eq!(holders, vec!["alice", "bob"]);
    }
}
