//! One-shot "you received an avatar" notifications.
//!
//! A grant sets the entry's `not_notified` flag. The flag is cleared only
//! after a notice is actually handed to an online user; an offline user keeps
//! it until they are next observed online. There is no expiry.

use std::sync::Arc;

use avatarium_types::avatar::AvatarId;
use avatarium_types::entry::AvatarEntry;
use avatarium_types::user::UserId;

/// Notice sent to a user after they receive one or more grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantNotice {
    pub user: UserId,
    /// Every avatar the user currently holds, in slot order.
    pub avatars: Vec<AvatarId>,
}

impl GrantNotice {
    pub fn message(&self) -> String {
        let list = self
            .avatars
            .iter()
            .map(AvatarId::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let noun = if self.avatars.len() == 1 {
            "a custom avatar"
        } else {
            "custom avatars"
        };
        format!(
            "You have been granted {noun}! You can now use: {list}. \
             Use /avatars to see them and /avatar <name> to pick one."
        )
    }
}

/// Presence and delivery channel to connected users.
pub trait Messenger: Send + Sync {
    /// Whether the user is connected right now.
    fn is_online(&self, user: &UserId) -> bool;

    /// Best-effort send. Returns true if the notice reached the user.
    fn deliver(&self, notice: &GrantNotice) -> bool;
}

impl<T: Messenger + ?Sized> Messenger for Arc<T> {
    fn is_online(&self, user: &UserId) -> bool {
        (**self).is_online(user)
    }

    fn deliver(&self, notice: &GrantNotice) -> bool {
        (**self).deliver(notice)
    }
}

/// Sends pending grant notices through a [`Messenger`].
#[derive(Debug)]
pub struct Notifier<M: Messenger> {
    messenger: M,
}

impl<M: Messenger> Notifier<M> {
    pub fn new(messenger: M) -> Self {
        Self { messenger }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Deliver the pending notice for `entry`, if any.
    ///
    /// Returns true when a notice was delivered and the flag cleared; the
    /// caller must then persist immediately.
    pub fn try_notify(&self, user: &UserId, entry: &mut AvatarEntry) -> bool {
        if !entry.not_notified || !self.messenger.is_online(user) {
            return false;
        }
        let notice = GrantNotice {
            user: user.clone(),
            avatars: entry.avatars().cloned().collect(),
        };
        if !self.messenger.deliver(&notice) {
            tracing::debug!(user = %user, "grant notice not delivered, will retry");
            return false;
        }
        entry.not_notified = false;
        tracing::info!(user = %user, avatars = notice.avatars.len(), "grant notice delivered");
        true
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    /// Messenger with a mutable online set that records deliveries.
    #[derive(Debug, Default)]
    pub struct FakeMessenger {
        online: Mutex<HashSet<UserId>>,
        delivered: Mutex<Vec<GrantNotice>>,
        refuse: bool,
    }

    impl FakeMessenger {
        /// Online users are seen but every delivery fails.
        pub fn refusing() -> Self {
            Self {
                refuse: true,
                ..Self::default()
            }
        }

        pub fn set_online(&self, user: &str, online: bool) {
            let user = UserId::normalize(user);
            let mut set = self.online.lock().unwrap();
            if online {
                set.insert(user);
            } else {
                set.remove(&user);
            }
        }

        pub fn delivered(&self) -> Vec<GrantNotice> {
            self.delivered.lock().unwrap().clone()
        }
    }

    impl Messenger for FakeMessenger {
        fn is_online(&self, user: &UserId) -> bool {
            self.online.lock().unwrap().contains(user)
        }

        fn deliver(&self, notice: &GrantNotice) -> bool {
            if self.refuse {
                return false;
            }
            self.delivered.lock().unwrap().push(notice.clone());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeMessenger;
    use super::*;

    fn pending_entry() -> AvatarEntry {
        let mut entry = AvatarEntry::from_slots(vec![None, Some(AvatarId::normalize("#cup"))]);
        entry.not_notified = true;
        entry
    }

    #[test]
    fn test_offline_user_keeps_flag() {
        let notifier = Notifier::new(FakeMessenger::default());
        let mut entry = pending_entry();
        assert!(!notifier.try_notify(&UserId::normalize("alice"), &mut entry));
        assert!(entry.not_notified);
        assert!(notifier.messenger().delivered().is_empty());
    }

    #[test]
    fn test_online_user_is_notified_once() {
        let messenger = FakeMessenger::default();
        messenger.set_online("alice", true);
        let notifier = Notifier::new(messenger);
        let user = UserId::normalize("alice");
        let mut entry = pending_entry();

        assert!(notifier.try_notify(&user, &mut entry));
        assert!(!entry.not_notified);
        assert!(!notifier.try_notify(&user, &mut entry));
        assert_eq!(notifier.messenger().delivered().len(), 1);
    }

    #[test]
    fn test_failed_delivery_keeps_flag() {
        let messenger = FakeMessenger::refusing();
        messenger.set_online("alice", true);
        let notifier = Notifier::new(messenger);
        let mut entry = pending_entry();
        assert!(!notifier.try_notify(&UserId::normalize("alice"), &mut entry));
        assert!(entry.not_notified);
    }

    #[test]
    fn test_notice_lists_real_avatars_only() {
        let notice = GrantNotice {
            user: UserId::normalize("alice"),
            avatars: pending_entry().avatars().cloned().collect(),
        };
        assert_eq!(notice.avatars, vec![AvatarId::normalize("#cup")]);
        assert!(notice.message().contains("a custom avatar"));
        assert!(notice.message().contains("#cup"));
    }
}
