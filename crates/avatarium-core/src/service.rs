//! Avatar grant service: the mutator.
//!
//! Owns the entry store and applies every grant, revoke, default change and
//! transfer as an idempotent state transition. Each operation reports whether
//! anything changed. Side effects (persistence, notification) follow the
//! change and never precede it.
//!
//! The service takes `&mut self` for writes: one control flow owns the store,
//! and callers serialize administrative read-then-write sequences.

use avatarium_types::avatar::AvatarId;
use avatarium_types::entry::{AvatarEntry, DefaultAvatar};
use avatarium_types::user::UserId;

use crate::catalog::OfficialCatalog;
use crate::clock::Clock;
use crate::notifier::{Messenger, Notifier};
use crate::persistence::{FlushMode, PersistenceGateway};
use crate::resolver::Resolver;
use crate::store::EntryStore;

/// Service owning the entry store and its side-effect ports.
pub struct AvatarService<P: PersistenceGateway, M: Messenger, C: Clock> {
    store: EntryStore,
    gateway: P,
    notifier: Notifier<M>,
    clock: C,
    catalog: &'static OfficialCatalog,
}

impl<P: PersistenceGateway, M: Messenger, C: Clock> AvatarService<P, M, C> {
    /// Create a service over a loaded store.
    pub fn new(store: EntryStore, gateway: P, messenger: M, clock: C) -> Self {
        Self {
            store,
            gateway,
            notifier: Notifier::new(messenger),
            clock,
            catalog: OfficialCatalog::global(),
        }
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn catalog(&self) -> &'static OfficialCatalog {
        self.catalog
    }

    pub fn messenger(&self) -> &M {
        self.notifier.messenger()
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.store, self.catalog, &self.clock)
    }

    pub fn entry(&self, user: &UserId) -> Option<&AvatarEntry> {
        self.store.get(user)
    }

    pub fn can_use(&self, user: &UserId, raw: &str) -> Option<AvatarId> {
        self.resolver().can_use(user, raw)
    }

    pub fn resolve_for_user(
        &self,
        user: &UserId,
        previous_ids: &[UserId],
        raw: &str,
    ) -> Option<AvatarId> {
        self.resolver().resolve_for_user(user, previous_ids, raw)
    }

    pub fn default_avatar(&self, user: &UserId) -> Option<AvatarId> {
        self.resolver().default_avatar(user)
    }

    /// Hand the current store to the persistence gateway.
    pub fn flush(&self, mode: FlushMode) {
        self.gateway.flush(self.store.snapshot(), mode);
    }

    /// Grant `avatar` as the user's personal avatar.
    ///
    /// Fills a vacant personal slot, otherwise pushes the previous personal
    /// avatar back. Any explicit default is cleared so the new avatar becomes
    /// the default.
    pub fn add_personal(&mut self, user: &UserId, avatar: AvatarId) -> bool {
        let now = self.clock.now();
        let entry = self.store.entry_mut(user);
        if !entry.set_personal(avatar.clone()) {
            self.store.prune(user);
            return false;
        }
        entry.time_received.get_or_insert(now);
        entry.time_updated = Some(now);
        entry.default = DefaultAvatar::Implicit;
        entry.not_notified = true;
        tracing::info!(user = %user, avatar = %avatar, "granted personal avatar");

        self.after_grant(user);
        true
    }

    /// Grant `avatar` as an additional (group) avatar, appended after the others.
    pub fn add_allowed(&mut self, user: &UserId, avatar: AvatarId) -> bool {
        let now = self.clock.now();
        let entry = self.store.entry_mut(user);
        if !entry.push_extra(avatar.clone()) {
            self.store.prune(user);
            return false;
        }
        entry.time_received.get_or_insert(now);
        entry.not_notified = true;
        tracing::info!(user = %user, avatar = %avatar, "granted avatar");

        self.after_grant(user);
        true
    }

    /// Revoke `avatar` from the user.
    ///
    /// The personal slot is vacated rather than shifted. The entry is deleted
    /// once no real avatar remains. Nothing is persisted here; batched
    /// callers flush once at the end.
    pub fn remove_allowed(&mut self, user: &UserId, avatar: &AvatarId) -> bool {
        let Some(entry) = self.store.get_mut(user) else {
            return false;
        };
        if !entry.remove(avatar) {
            return false;
        }
        if self.store.prune(user) {
            tracing::info!(user = %user, avatar = %avatar, "revoked last avatar, entry deleted");
        } else {
            tracing::info!(user = %user, avatar = %avatar, "revoked avatar");
        }
        true
    }

    /// Set the default avatar; `None` means "no default".
    ///
    /// No-op when it already equals the resolved default. Choosing the
    /// personal avatar collapses back to the implicit default.
    pub fn set_default(&mut self, user: &UserId, avatar: Option<AvatarId>) -> bool {
        if avatar == self.default_avatar(user) {
            return false;
        }
        let Some(entry) = self.store.get_mut(user) else {
            return false;
        };
        entry.default = if avatar.as_ref() == entry.personal() {
            DefaultAvatar::Implicit
        } else {
            match &avatar {
                Some(avatar) => DefaultAvatar::Explicit(avatar.clone()),
                None => DefaultAvatar::Cleared,
            }
        };
        tracing::info!(
            user = %user,
            avatar = avatar.as_ref().map(AvatarId::as_str).unwrap_or("none"),
            "default avatar changed"
        );
        self.flush(FlushMode::Debounced);
        true
    }

    /// Move every grant of `from` onto `to` and delete `from`.
    ///
    /// The source entry becomes the destination's entry; avatars the
    /// destination already held and the source lacks are appended. The swap
    /// happens in one step with no partially merged state in between.
    pub fn move_avatars(&mut self, from: &UserId, to: &UserId) -> bool {
        if from == to {
            return false;
        }
        let Some(mut merged) = self.store.take(from) else {
            return false;
        };
        if let Some(existing) = self.store.take(to) {
            merged.absorb(existing);
        }
        tracing::info!(from = %from, to = %to, avatars = merged.len(), "moved avatars");
        self.store.insert(to.clone(), merged);
        self.flush(FlushMode::Immediate);
        true
    }

    /// Login hook: deliver a pending grant notice now that `user` is online.
    pub fn on_user_online(&mut self, user: &UserId) -> bool {
        self.try_notify(user)
    }

    fn after_grant(&mut self, user: &UserId) {
        if !self.try_notify(user) {
            self.flush(FlushMode::Debounced);
        }
    }

    /// Returns true if a notice went out (and was persisted immediately).
    fn try_notify(&mut self, user: &UserId) -> bool {
        let Some(entry) = self.store.get_mut(user) else {
            return false;
        };
        if !self.notifier.try_notify(user, entry) {
            return false;
        }
        self.flush(FlushMode::Immediate);
        true
    }
}
