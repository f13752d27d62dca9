//! Operator grant commands: grant, allow, revoke, revoke-group, move.

use anyhow::Result;
use console::style;

use avatarium_types::user::UserId;

use crate::state::AppState;

fn user_list(users: &[UserId]) -> String {
    users
        .iter()
        .map(UserId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Grant a personal avatar after checking that its asset exists.
///
/// # Examples
///
/// ```bash
/// avatarctl grant zarel '#zarel'
/// avatarctl grant zarel zarel.png
/// ```
pub async fn grant(state: &mut AppState, user: &str, avatar: &str, json: bool) -> Result<()> {
    let grant = state
        .service
        .check_personal_grant(user, avatar, &state.checker)
        .await?;
    let user = grant.user().clone();
    let changed = state.service.grant_personal(grant);
    let notified = changed
        && state
            .service
            .entry(&user)
            .is_some_and(|entry| !entry.not_notified);

    if json {
        println!(
            "{}",
            serde_json::json!({"user": user, "avatar": avatar, "changed": changed, "notified": notified})
        );
    } else if changed {
        println!(
            "  {} Granted '{}' to {} as their personal avatar",
            style("✓").green().bold(),
            style(avatar).cyan(),
            style(&user).bold()
        );
        if !notified {
            println!("  {} They will be notified next time they are online.", style("i").blue().bold());
        }
    } else {
        println!(
            "  {} {} already has '{}' as their personal avatar",
            style("i").blue().bold(),
            style(&user).bold(),
            avatar
        );
    }
    Ok(())
}

/// Grant one avatar to several users. Persisted immediately.
pub async fn allow(state: &mut AppState, avatar: &str, users: &[String], json: bool) -> Result<()> {
    let grant = state
        .service
        .check_group_grant(users, avatar, &state.checker)
        .await?;
    let changed = state.service.grant_group(grant);

    if json {
        println!("{}", serde_json::json!({"avatar": avatar, "granted": changed}));
    } else if changed.is_empty() {
        println!(
            "  {} Everyone listed already has '{}'",
            style("i").blue().bold(),
            avatar
        );
    } else {
        println!(
            "  {} Granted '{}' to {}",
            style("✓").green().bold(),
            style(avatar).cyan(),
            style(user_list(&changed)).bold()
        );
    }
    Ok(())
}

pub fn revoke(state: &mut AppState, user: &str, avatar: &str, json: bool) -> Result<()> {
    let removed = state.service.revoke(user, avatar)?;
    let user = UserId::normalize(user);
    let remaining = state.service.entry(&user).map(|e| e.len()).unwrap_or(0);

    if json {
        println!(
            "{}",
            serde_json::json!({"user": user, "revoked": removed, "remaining": remaining})
        );
    } else {
        println!(
            "  {} Revoked '{}' from {}",
            style("✓").green().bold(),
            style(&removed).cyan(),
            style(&user).bold()
        );
        if remaining == 0 {
            println!("  {} {} has no custom avatars left", style("i").blue().bold(), user);
        }
    }
    Ok(())
}

pub fn revoke_group(state: &mut AppState, avatar: &str, users: &[String], json: bool) -> Result<()> {
    let changed = state.service.revoke_group(users, avatar)?;

    if json {
        println!("{}", serde_json::json!({"avatar": avatar, "revoked": changed}));
    } else {
        println!(
            "  {} Revoked '{}' from {}",
            style("✓").green().bold(),
            style(avatar).cyan(),
            style(user_list(&changed)).bold()
        );
    }
    Ok(())
}

/// Move all grants from one account to another, merging with what the
/// destination already has.
pub fn move_avatars(state: &mut AppState, from: &str, to: &str, json: bool) -> Result<()> {
    let moved = state.service.transfer(from, to)?;
    let to = UserId::normalize(to);
    let avatars: Vec<String> = state
        .service
        .entry(&to)
        .map(|entry| entry.avatars().map(ToString::to_string).collect())
        .unwrap_or_default();

    if json {
        println!(
            "{}",
            serde_json::json!({"from": UserId::normalize(from), "to": to, "moved": moved, "avatars": avatars})
        );
    } else if moved {
        println!(
            "  {} Moved avatars from {} to {} ({})",
            style("✓").green().bold(),
            style(UserId::normalize(from)).bold(),
            style(&to).bold(),
            avatars.join(", ")
        );
    } else {
        println!("  {} Source and destination are the same account", style("i").blue().bold());
    }
    Ok(())
}
