//! One-time migration from the legacy flat configuration maps.
//!
//! Legacy operators configured grants as two maps: user -> personal avatar and
//! avatar -> users. Both fold into per-user entries. Legacy grants are already
//! known to their owners, so no notification is queued for them.

use avatarium_types::avatar::AvatarId;
use avatarium_types::config::LegacyAvatarConfig;
use avatarium_types::user::UserId;

use crate::store::EntryStore;

/// Outcome of startup loading, for the caller to report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Legacy grants were folded into a fresh store. False on a fresh
    /// install, where the legacy maps were empty.
    pub migrated: bool,
    pub personal_grants: usize,
    pub group_grants: usize,
    /// Legacy values that could not be migrated, as `user: avatar`.
    pub skipped: Vec<String>,
}

impl MigrationReport {
    /// A durable record already existed; nothing was migrated.
    pub fn not_needed() -> Self {
        Self::default()
    }

    /// Warning the operator should see once after a migration.
    pub fn operator_warning(&self) -> Option<String> {
        if !self.migrated {
            return None;
        }
        Some(format!(
            "Migrated {} personal and {} group avatar grants from the legacy \
             configuration. Remove the [legacy] custom_avatars and allowed_avatars \
             settings from config.toml; they are no longer read.",
            self.personal_grants, self.group_grants
        ))
    }
}

/// Fold the legacy maps into a new store.
///
/// Personal avatars fill slot 0; group avatars are appended after it in
/// map order, leaving slot 0 vacant for users without a personal avatar.
/// Empty maps give an empty store and a report with nothing to warn about.
pub fn migrate_legacy(legacy: &LegacyAvatarConfig) -> (EntryStore, MigrationReport) {
    let mut store = EntryStore::new();
    if legacy.is_empty() {
        tracing::debug!("no legacy avatar settings; starting with an empty record");
        return (store, MigrationReport::not_needed());
    }
    let mut report = MigrationReport {
        migrated: true,
        ..MigrationReport::default()
    };

    for (raw_user, raw_avatar) in &legacy.custom_avatars {
        let user = UserId::normalize(raw_user);
        let Some(avatar) = legacy_avatar(raw_avatar) else {
            report.skipped.push(format!("{raw_user}: {raw_avatar}"));
            continue;
        };
        if user.is_empty() {
            report.skipped.push(format!("{raw_user}: {raw_avatar}"));
            continue;
        }
        if store.entry_mut(&user).set_personal(avatar) {
            report.personal_grants += 1;
        }
    }

    for (raw_avatar, users) in &legacy.allowed_avatars {
        let Some(avatar) = legacy_avatar(raw_avatar) else {
            report
                .skipped
                .extend(users.iter().map(|u| format!("{u}: {raw_avatar}")));
            continue;
        };
        for raw_user in users {
            let user = UserId::normalize(raw_user);
            if user.is_empty() {
                report.skipped.push(format!("{raw_user}: {raw_avatar}"));
                continue;
            }
            if store.entry_mut(&user).push_extra(avatar.clone()) {
                report.group_grants += 1;
            }
        }
    }

    for skipped in &report.skipped {
        tracing::warn!(grant = %skipped, "legacy avatar grant not migrated");
    }
    tracing::info!(
        users = store.len(),
        personal = report.personal_grants,
        group = report.group_grants,
        "migrated legacy avatar configuration"
    );
    (store, report)
}

fn legacy_avatar(raw: &str) -> Option<AvatarId> {
    AvatarId::parse(raw).ok()
}
