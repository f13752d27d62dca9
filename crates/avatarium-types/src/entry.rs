//! Per-user avatar grant entry.
//!
//! The allow-list is a fixed head plus an ordered tail: slot 0 holds the
//! personal avatar (possibly vacant) and the tail holds group grants in the
//! order they were received. No identifier appears twice across both.

use chrono::{DateTime, Utc};

use crate::avatar::AvatarId;

/// Which avatar an entry uses when the user has not picked one this session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DefaultAvatar {
    /// No override; the personal slot is the default.
    #[default]
    Implicit,
    /// Override explicitly set to "no default".
    Cleared,
    /// Override pointing at a held avatar other than the personal one.
    Explicit(AvatarId),
}

/// Avatar grants held by one user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AvatarEntry {
    personal: Option<AvatarId>,
    extra: Vec<AvatarId>,
    pub default: DefaultAvatar,
    /// First grant; set once.
    pub time_received: Option<DateTime<Utc>>,
    /// Most recent personal grant.
    pub time_updated: Option<DateTime<Utc>>,
    /// A grant happened that the user has not been told about yet.
    pub not_notified: bool,
}

impl AvatarEntry {
    /// An entry with no grants. Stores never keep one of these.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from the slot layout of the durable record.
    ///
    /// Slot 0 is the personal avatar. Vacant tail slots and repeated
    /// identifiers are dropped, keeping the first occurrence.
    pub fn from_slots(slots: Vec<Option<AvatarId>>) -> Self {
        let mut slots = slots.into_iter();
        let mut entry = Self {
            personal: slots.next().flatten(),
            ..Self::default()
        };
        for avatar in slots.flatten() {
            entry.push_extra(avatar);
        }
        entry
    }

    pub fn personal(&self) -> Option<&AvatarId> {
        self.personal.as_ref()
    }

    pub fn extra(&self) -> &[AvatarId] {
        &self.extra
    }

    /// Slot view: personal slot first (possibly vacant), then the tail.
    pub fn slots(&self) -> Vec<Option<&AvatarId>> {
        std::iter::once(self.personal.as_ref())
            .chain(self.extra.iter().map(Some))
            .collect()
    }

    /// Every held identifier in slot order.
    pub fn avatars(&self) -> impl Iterator<Item = &AvatarId> {
        self.personal.iter().chain(self.extra.iter())
    }

    pub fn contains(&self, avatar: &AvatarId) -> bool {
        self.personal.as_ref() == Some(avatar) || self.extra.contains(avatar)
    }

    /// True when no real identifier is left.
    pub fn is_empty(&self) -> bool {
        self.personal.is_none() && self.extra.is_empty()
    }

    pub fn len(&self) -> usize {
        self.avatars().count()
    }

    /// Put `avatar` in the personal slot.
    ///
    /// A vacant slot is filled in place; otherwise the current personal avatar
    /// moves to the front of the tail. Returns false if already held.
    pub fn set_personal(&mut self, avatar: AvatarId) -> bool {
        if self.contains(&avatar) {
            return false;
        }
        if let Some(previous) = self.personal.replace(avatar) {
            self.extra.insert(0, previous);
        }
        true
    }

    /// Append a group grant. Returns false if already held.
    pub fn push_extra(&mut self, avatar: AvatarId) -> bool {
        if self.contains(&avatar) {
            return false;
        }
        self.extra.push(avatar);
        true
    }

    /// Remove a grant.
    ///
    /// The personal slot is vacated, never shifted. An explicit default that
    /// pointed at the removed avatar falls back to implicit.
    pub fn remove(&mut self, avatar: &AvatarId) -> bool {
        if self.personal.as_ref() == Some(avatar) {
            self.personal = None;
        } else if let Some(pos) = self.extra.iter().position(|a| a == avatar) {
            self.extra.remove(pos);
        } else {
            return false;
        }
        if self.default == DefaultAvatar::Explicit(avatar.clone()) {
            self.default = DefaultAvatar::Implicit;
        }
        true
    }

    /// Fold another entry's grants into this one.
    ///
    /// The other entry's personal avatar takes this entry's personal slot
    /// when it is vacant. Other identifiers not already held are appended to
    /// the tail in the other entry's slot order. The earliest receipt time,
    /// the latest update time and any pending notification carry over.
    pub fn absorb(&mut self, other: AvatarEntry) {
        let AvatarEntry {
            personal,
            extra,
            time_received,
            time_updated,
            not_notified,
            ..
        } = other;
        let personal = match personal {
            Some(avatar) if self.personal.is_none() && !self.contains(&avatar) => {
                self.personal = Some(avatar);
                None
            }
            personal => personal,
        };
        for avatar in personal.into_iter().chain(extra) {
            self.push_extra(avatar);
        }
        self.time_received = match (self.time_received, time_received) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.time_updated = match (self.time_updated, time_updated) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.not_notified |= not_notified;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AvatarId {
        AvatarId::normalize(s)
    }

    #[test]
    fn test_set_personal_fills_vacant_slot() {
        let mut entry = AvatarEntry::from_slots(vec![None, Some(id("#foo"))]);
        assert!(entry.set_personal(id("#bar")));
        assert_eq!(entry.slots(), vec![Some(&id("#bar")), Some(&id("#foo"))]);
    }

    #[test]
    fn test_set_personal_shifts_previous() {
        let mut entry = AvatarEntry::from_slots(vec![Some(id("#a")), Some(id("#b"))]);
        assert!(entry.set_personal(id("#c")));
        let ids: Vec<&str> = entry.avatars().map(|a| a.as_str()).collect();
        assert_eq!(ids, vec!["#c", "#a", "#b"]);
    }

    #[test]
    fn test_set_personal_already_held_is_noop() {
        let mut entry = AvatarEntry::from_slots(vec![Some(id("#a")), Some(id("#b"))]);
        assert!(!entry.set_personal(id("#b")));
        assert_eq!(entry.len(), 2);
    }

    #[test]
    fn test_remove_personal_leaves_vacancy() {
        let mut entry = AvatarEntry::from_slots(vec![Some(id("#a")), Some(id("#b"))]);
        assert!(entry.remove(&id("#a")));
        assert_eq!(entry.slots(), vec![None, Some(&id("#b"))]);
        assert!(!entry.is_empty());
    }

    #[test]
    fn test_remove_last_real_makes_empty() {
        let mut entry = AvatarEntry::from_slots(vec![None, Some(id("#foo"))]);
        assert!(entry.remove(&id("#foo")));
        assert!(entry.is_empty());
    }

    #[test]
    fn test_remove_resets_dangling_default() {
        let mut entry = AvatarEntry::from_slots(vec![Some(id("#a")), Some(id("#b"))]);
        entry.default = DefaultAvatar::Explicit(id("#b"));
        entry.remove(&id("#b"));
        assert_eq!(entry.default, DefaultAvatar::Implicit);
    }

    #[test]
    fn test_from_slots_dedupes() {
        let entry = AvatarEntry::from_slots(vec![
            Some(id("#a")),
            Some(id("#b")),
            None,
            Some(id("#a")),
            Some(id("#b")),
        ]);
        assert_eq!(entry.slots(), vec![Some(&id("#a")), Some(&id("#b"))]);
    }

    #[test]
    fn test_absorb_appends_missing_and_merges_flags() {
        let t1 = DateTime::from_timestamp_millis(1_000).unwrap();
        let t2 = DateTime::from_timestamp_millis(2_000).unwrap();

        let mut target = AvatarEntry::from_slots(vec![Some(id("#a"))]);
        target.time_received = Some(t2);
        target.time_updated = Some(t2);

        let mut other = AvatarEntry::from_slots(vec![Some(id("#b")), Some(id("#a"))]);
        other.time_received = Some(t1);
        other.time_updated = Some(t1);
        other.not_notified = true;

        target.absorb(other);
        let ids: Vec<&str> = target.avatars().map(|a| a.as_str()).collect();
        assert_eq!(ids, vec!["#a", "#b"]);
        assert_eq!(target.time_received, Some(t1));
        assert_eq!(target.time_updated, Some(t2));
        assert!(target.not_notified);
    }

    #[test]
    fn test_absorb_fills_vacant_personal_slot() {
        let mut source = AvatarEntry::from_slots(vec![None, Some(id("#cup"))]);
        let target = AvatarEntry::from_slots(vec![Some(id("#mine")), Some(id("#b"))]);

        source.absorb(target);
        assert_eq!(
            source.slots(),
            vec![Some(&id("#mine")), Some(&id("#cup")), Some(&id("#b"))]
        );
        assert_eq!(source.personal(), Some(&id("#mine")));

        // already held in the tail, so it stays there
        let mut source = AvatarEntry::from_slots(vec![None, Some(id("#mine"))]);
        source.absorb(AvatarEntry::from_slots(vec![Some(id("#mine"))]));
        assert_eq!(source.slots(), vec![None, Some(&id("#mine"))]);
    }
}
