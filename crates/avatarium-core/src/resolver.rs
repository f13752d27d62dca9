//! Read-only queries over the entry store.

use chrono::Datelike;

use avatarium_types::avatar::AvatarId;
use avatarium_types::entry::{AvatarEntry, DefaultAvatar};
use avatarium_types::user::UserId;

use crate::catalog::OfficialCatalog;
use crate::clock::Clock;
use crate::exists::{AssetExistenceChecker, avatar_exists};
use crate::store::EntryStore;

/// Month (1-based) in which seasonal avatars take over the default.
const SEASONAL_MONTH: u32 = 12;

/// Permission checks and default resolution for one store snapshot.
pub struct Resolver<'a> {
    store: &'a EntryStore,
    catalog: &'a OfficialCatalog,
    clock: &'a dyn Clock,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a EntryStore, catalog: &'a OfficialCatalog, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            catalog,
            clock,
        }
    }

    pub fn entry(&self, user: &UserId) -> Option<&'a AvatarEntry> {
        self.store.get(user)
    }

    /// The avatar `user` may use for `raw`, as stored.
    ///
    /// Official avatars are returned as-is. Otherwise the user's grants are
    /// searched for the exact id, then with a `#` added, then with a leading
    /// `#` removed, so either spelling of a server-custom avatar works.
    pub fn can_use(&self, user: &UserId, raw: &str) -> Option<AvatarId> {
        let avatar = AvatarId::normalize(raw);
        if avatar.as_str().is_empty() {
            return None;
        }
        if self.catalog.contains(&avatar) {
            return Some(avatar);
        }
        let entry = self.store.get(user)?;
        if entry.contains(&avatar) {
            return Some(avatar);
        }
        [avatar.with_custom_marker(), avatar.without_custom_marker()]
            .into_iter()
            .flatten()
            .find(|candidate| entry.contains(candidate))
    }

    /// [`Resolver::can_use`] for the current id, then each previous id in order.
    pub fn resolve_for_user(
        &self,
        user: &UserId,
        previous_ids: &[UserId],
        raw: &str,
    ) -> Option<AvatarId> {
        std::iter::once(user)
            .chain(previous_ids.iter())
            .find_map(|id| self.can_use(id, raw))
    }

    /// The avatar `user` shows by default.
    ///
    /// In December the first seasonal (`...xmas`) avatar held wins over any
    /// explicit default. Otherwise the explicit default, else the personal slot.
    pub fn default_avatar(&self, user: &UserId) -> Option<AvatarId> {
        let entry = self.store.get(user)?;
        if self.clock.now().month() == SEASONAL_MONTH {
            if let Some(seasonal) = entry.avatars().find(|a| a.is_seasonal()) {
                return Some(seasonal.clone());
            }
        }
        match &entry.default {
            DefaultAvatar::Implicit => entry.personal().cloned(),
            DefaultAvatar::Cleared => None,
            DefaultAvatar::Explicit(avatar) => Some(avatar.clone()),
        }
    }

    /// Whether `avatar` is backed by a real asset.
    pub async fn exists<A: AssetExistenceChecker>(&self, avatar: &AvatarId, checker: &A) -> bool {
        avatar_exists(avatar, self.catalog, checker).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::clock::FixedClock;

    fn store(json: serde_json::Value) -> EntryStore {
        EntryStore::from_snapshot(serde_json::from_value(json).unwrap()).0
    }

    fn june() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    fn december() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 12, 24, 12, 0, 0).unwrap())
    }

    fn user(s: &str) -> UserId {
        UserId::normalize(s)
    }

    #[test]
    fn test_can_use_official_without_entry() {
        let store = EntryStore::new();
        let clock = june();
        let resolver = Resolver::new(&store, OfficialCatalog::global(), &clock);
        assert_eq!(
            resolver.can_use(&user("nobody"), "Lucas"),
            Some(AvatarId::normalize("lucas"))
        );
    }

    #[test]
    fn test_can_use_tries_marker_variants() {
        let store = store(serde_json::json!({
            "alice": {"allowed": ["#alice", "bob.png"]},
        }));
        let clock = june();
        let resolver = Resolver::new(&store, OfficialCatalog::global(), &clock);
        assert_eq!(
            resolver.can_use(&user("alice"), "alice"),
            Some(AvatarId::normalize("#alice"))
        );
        assert_eq!(
            resolver.can_use(&user("alice"), "#bob.png"),
            Some(AvatarId::normalize("bob.png"))
        );
        assert_eq!(resolver.can_use(&user("alice"), "#carol"), None);
        assert_eq!(resolver.can_use(&user("bob"), "#alice"), None);
    }

    #[test]
    fn test_resolve_for_user_checks_previous_ids_in_order() {
        let store = store(serde_json::json!({
            "oldname": {"allowed": ["#legacy"]},
            "older": {"allowed": ["#legacy2"]},
        }));
        let clock = june();
        let resolver = Resolver::new(&store, OfficialCatalog::global(), &clock);
        let previous = vec![user("oldname"), user("older")];
        assert_eq!(
            resolver.resolve_for_user(&user("newname"), &previous, "legacy2"),
            Some(AvatarId::normalize("#legacy2"))
        );
        assert_eq!(
            resolver.resolve_for_user(&user("newname"), &[], "legacy"),
            None
        );
    }

    #[test]
    fn test_default_prefers_explicit_then_personal() {
        let store = store(serde_json::json!({
            "alice": {"allowed": ["#alice", "#cup"], "default": "#cup"},
            "bob": {"allowed": ["#bob", "#cup"]},
            "carol": {"allowed": [null, "#cup"]},
            "dave": {"allowed": ["#dave"], "default": null},
        }));
        let clock = june();
        let resolver = Resolver::new(&store, OfficialCatalog::global(), &clock);
        assert_eq!(resolver.default_avatar(&user("alice")), Some(AvatarId::normalize("#cup")));
        assert_eq!(resolver.default_avatar(&user("bob")), Some(AvatarId::normalize("#bob")));
        assert_eq!(resolver.default_avatar(&user("carol")), None);
        assert_eq!(resolver.default_avatar(&user("dave")), None);
        assert_eq!(resolver.default_avatar(&user("erin")), None);
    }

    #[test]
    fn test_december_picks_first_seasonal_over_explicit_default() {
        let store = store(serde_json::json!({
            "alice": {
                "allowed": ["#alice", "#santaxmas", "#elfxmas"],
                "default": "#alice"
            },
        }));
        let clock = december();
        let resolver = Resolver::new(&store, OfficialCatalog::global(), &clock);
        assert_eq!(
            resolver.default_avatar(&user("alice")),
            Some(AvatarId::normalize("#santaxmas"))
        );

        let clock = june();
        let resolver = Resolver::new(&store, OfficialCatalog::global(), &clock);
        assert_eq!(
            resolver.default_avatar(&user("alice")),
            Some(AvatarId::normalize("#alice"))
        );
    }

    #[test]
    fn test_december_without_seasonal_uses_normal_rules() {
        let store = store(serde_json::json!({"alice": {"allowed": ["#alice"]}}));
        let clock = december();
        let resolver = Resolver::new(&store, OfficialCatalog::global(), &clock);
        assert_eq!(
            resolver.default_avatar(&user("alice")),
            Some(AvatarId::normalize("#alice"))
        );
    }
}
