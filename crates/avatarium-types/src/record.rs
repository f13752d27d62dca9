//! Durable JSON shape of the avatar store.
//!
//! ```json
//! {
//!   "zarel": {
//!     "allowed": [null, "#zarel-2", "zarel.png"],
//!     "default": "zarel.png",
//!     "timeReceived": 1700000000000,
//!     "timeUpdated": 1700000000000,
//!     "notNotified": true
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::avatar::AvatarId;
use crate::entry::{AvatarEntry, DefaultAvatar};

/// Whole-store snapshot keyed by user id, sorted for stable output.
pub type StoreSnapshot = BTreeMap<String, EntryRecord>;

/// One user's entry as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    /// Slot 0 is the personal avatar and may be `null`.
    pub allowed: Vec<Option<AvatarId>>,

    /// Absent: implicit default. `null`: no default. String: explicit default.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub default: Option<Option<AvatarId>>,

    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_received: Option<i64>,

    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_updated: Option<i64>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub not_notified: bool,
}

/// Distinguishes a present `null` from a missing key.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Option<AvatarId>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<AvatarId>::deserialize(deserializer).map(Some)
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn to_millis(time: Option<DateTime<Utc>>) -> Option<i64> {
    time.map(|t| t.timestamp_millis())
}

fn from_millis(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(DateTime::from_timestamp_millis)
}

impl EntryRecord {
    /// Convert into a live entry.
    ///
    /// Returns `None` when the record holds no real identifier; such a
    /// record means "no entry".
    pub fn into_entry(self) -> Option<AvatarEntry> {
        let mut entry = AvatarEntry::from_slots(self.allowed);
        if entry.is_empty() {
            return None;
        }
        entry.default = match self.default {
            None => DefaultAvatar::Implicit,
            Some(None) => DefaultAvatar::Cleared,
            Some(Some(avatar)) => DefaultAvatar::Explicit(avatar),
        };
        entry.time_received = from_millis(self.time_received);
        entry.time_updated = from_millis(self.time_updated);
        entry.not_notified = self.not_notified;
        Some(entry)
    }
}

impl From<&AvatarEntry> for EntryRecord {
    fn from(entry: &AvatarEntry) -> Self {
        Self {
            allowed: entry.slots().into_iter().map(|a| a.cloned()).collect(),
            default: match &entry.default {
                DefaultAvatar::Implicit => None,
                DefaultAvatar::Cleared => Some(None),
                DefaultAvatar::Explicit(avatar) => Some(Some(avatar.clone())),
            },
            time_received: to_millis(entry.time_received),
            time_updated: to_millis(entry.time_updated),
            not_notified: entry.not_notified,
        }
    }
}
