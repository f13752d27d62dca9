//! Terminal stand-in for the chat server's presence and messaging.
//!
//! Nobody is online until `avatarctl login` marks them so; delivered notices
//! are kept for the command to print.

use std::collections::HashSet;
use std::sync::Mutex;

use avatarium_core::notifier::{GrantNotice, Messenger};
use avatarium_types::user::UserId;

#[derive(Debug, Default)]
pub struct ConsoleMessenger {
    online: Mutex<HashSet<UserId>>,
    delivered: Mutex<Vec<GrantNotice>>,
}

impl ConsoleMessenger {
    pub fn set_online(&self, user: &UserId) {
        if let Ok(mut online) = self.online.lock() {
            online.insert(user.clone());
        }
    }

    /// Notices delivered during this process.
    pub fn delivered(&self) -> Vec<GrantNotice> {
        self.delivered
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }
}

impl Messenger for ConsoleMessenger {
    fn is_online(&self, user: &UserId) -> bool {
        self.online
            .lock()
            .map(|online| online.contains(user))
            .unwrap_or(false)
    }

    fn deliver(&self, notice: &GrantNotice) -> bool {
        let Ok(mut delivered) = self.delivered.lock() else {
            return false;
        };
        delivered.push(notice.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatarium_types::avatar::AvatarId;

    #[test]
    fn offline_until_marked() {
        let messenger = ConsoleMessenger::default();
        let user = UserId::normalize("zarel");
        assert!(!messenger.is_online(&user));
        messenger.set_online(&user);
        assert!(messenger.is_online(&user));
    }

    #[test]
    fn deliver_records_notice() {
        let messenger = ConsoleMessenger::default();
        let notice = GrantNotice {
            user: UserId::normalize("zarel"),
            avatars: vec![AvatarId::normalize("#zarel")],
        };
        assert!(messenger.deliver(&notice));
        assert_eq!(messenger.delivered(), vec![notice]);
    }
}
