//! Operator-facing grant operations.
//!
//! These wrap the idempotent mutator calls with input validation and the
//! error taxonomy shown to operators. Grants are checked against the asset
//! checker through `&self` first and applied through `&mut self` after, so
//! the store is never touched or held exclusively while a mirror request is
//! pending.

use avatarium_types::avatar::AvatarId;
use avatarium_types::entry::AvatarEntry;
use avatarium_types::error::AvatarError;
use avatarium_types::user::UserId;

use crate::clock::Clock;
use crate::exists::{AssetExistenceChecker, validate_avatar};
use crate::notifier::Messenger;
use crate::persistence::{FlushMode, PersistenceGateway};
use crate::service::AvatarService;

/// A personal grant whose user and avatar have passed validation.
///
/// Only [`AvatarService::check_personal_grant`] builds one, so applying it
/// never needs the asset checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalGrant {
    user: UserId,
    avatar: AvatarId,
}

impl PersonalGrant {
    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn avatar(&self) -> &AvatarId {
        &self.avatar
    }
}

/// A validated grant of one avatar to a deduplicated list of users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupGrant {
    users: Vec<UserId>,
    avatar: AvatarId,
}

impl GroupGrant {
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn avatar(&self) -> &AvatarId {
        &self.avatar
    }
}

impl<P: PersistenceGateway, M: Messenger, C: Clock> AvatarService<P, M, C> {
    /// Validate a personal grant. Official avatars are rejected as already
    /// universal.
    ///
    /// Only reads the service, so other readers can run while the mirror
    /// request is in flight.
    pub async fn check_personal_grant<A: AssetExistenceChecker>(
        &self,
        raw_user: &str,
        raw_avatar: &str,
        checker: &A,
    ) -> Result<PersonalGrant, AvatarError> {
        let user = UserId::parse(raw_user)?;
        let avatar = validate_avatar(raw_avatar, false, self.catalog(), checker).await?;
        Ok(PersonalGrant { user, avatar })
    }

    /// Apply a checked personal grant.
    pub fn grant_personal(&mut self, grant: PersonalGrant) -> bool {
        self.add_personal(&grant.user, grant.avatar)
    }

    /// Validate once for a whole group of users.
    pub async fn check_group_grant<A: AssetExistenceChecker>(
        &self,
        raw_users: &[String],
        raw_avatar: &str,
        checker: &A,
    ) -> Result<GroupGrant, AvatarError> {
        let users = parse_users(raw_users)?;
        let avatar = validate_avatar(raw_avatar, false, self.catalog(), checker).await?;
        Ok(GroupGrant { users, avatar })
    }

    /// Apply a checked group grant.
    ///
    /// Returns the users whose grants changed. The result is persisted
    /// immediately.
    pub fn grant_group(&mut self, grant: GroupGrant) -> Vec<UserId> {
        let mut changed = Vec::new();
        for user in grant.users {
            if self.add_allowed(&user, grant.avatar.clone()) {
                changed.push(user);
            }
        }
        if !changed.is_empty() {
            self.flush(FlushMode::Immediate);
        }
        changed
    }

    /// Revoke one avatar from one user.
    pub fn revoke(&mut self, raw_user: &str, raw_avatar: &str) -> Result<AvatarId, AvatarError> {
        let user = UserId::parse(raw_user)?;
        let avatar = self.held_avatar(&user, raw_avatar)?;
        self.remove_allowed(&user, &avatar);
        self.flush(FlushMode::Debounced);
        Ok(avatar)
    }

    /// Revoke one avatar from many users, persisting once at the end.
    ///
    /// Users who did not hold it are skipped. Fails with `NoSuchGrant` only
    /// when nobody held it.
    pub fn revoke_group(
        &mut self,
        raw_users: &[String],
        raw_avatar: &str,
    ) -> Result<Vec<UserId>, AvatarError> {
        let users = parse_users(raw_users)?;
        let avatar = AvatarId::normalize(raw_avatar);

        let mut changed = Vec::new();
        for user in users {
            let held = self
                .resolver()
                .entry(&user)
                .and_then(|entry| matching_grant(entry, &avatar));
            if let Some(held) = held {
                if self.remove_allowed(&user, &held) {
                    changed.push(user);
                }
            }
        }
        if changed.is_empty() {
            return Err(AvatarError::NoSuchGrant {
                user: raw_users.join(", "),
                avatar: Some(avatar.to_string()),
            });
        }
        self.flush(FlushMode::Immediate);
        Ok(changed)
    }

    /// A user picks their default avatar, or resets to the personal one with `None`.
    ///
    /// Grants held under `previous_ids` count, but the default is stored on
    /// the current id's entry.
    pub fn choose_default(
        &mut self,
        user: &UserId,
        previous_ids: &[UserId],
        raw_avatar: Option<&str>,
    ) -> Result<bool, AvatarError> {
        let Some(entry) = self.entry(user) else {
            return Err(AvatarError::NoSuchGrant {
                user: user.to_string(),
                avatar: raw_avatar.map(str::to_string),
            });
        };
        let target = match raw_avatar {
            None => entry.personal().cloned(),
            Some(raw) => Some(self.resolve_for_user(user, previous_ids, raw).ok_or_else(|| {
                AvatarError::NoSuchGrant {
                    user: user.to_string(),
                    avatar: Some(AvatarId::normalize(raw).to_string()),
                }
            })?),
        };
        Ok(self.set_default(user, target))
    }

    /// Move all of one account's grants to another.
    pub fn transfer(&mut self, raw_from: &str, raw_to: &str) -> Result<bool, AvatarError> {
        let from = UserId::parse(raw_from)?;
        let to = UserId::parse(raw_to)?;
        if self.entry(&from).is_none() {
            return Err(AvatarError::NoSuchGrant {
                user: from.to_string(),
                avatar: None,
            });
        }
        Ok(self.move_avatars(&from, &to))
    }

    /// The stored form of `raw` if `user` holds it.
    fn held_avatar(&self, user: &UserId, raw: &str) -> Result<AvatarId, AvatarError> {
        let avatar = AvatarId::normalize(raw);
        self.entry(user)
            .and_then(|entry| matching_grant(entry, &avatar))
            .ok_or_else(|| AvatarError::NoSuchGrant {
                user: user.to_string(),
                avatar: Some(avatar.to_string()),
            })
    }
}

/// The grant in `entry` matching `avatar` exactly or up to a `#` marker.
fn matching_grant(entry: &AvatarEntry, avatar: &AvatarId) -> Option<AvatarId> {
    std::iter::once(Some(avatar.clone()))
        .chain([avatar.with_custom_marker(), avatar.without_custom_marker()])
        .flatten()
        .find(|candidate| entry.contains(candidate))
}

fn parse_users(raw_users: &[String]) -> Result<Vec<UserId>, AvatarError> {
    let mut users: Vec<UserId> = Vec::with_capacity(raw_users.len());
    for raw in raw_users {
        let user = UserId::parse(raw)?;
        if !users.contains(&user) {
            users.push(user);
        }
    }
    Ok(users)
}
