//! Commands acting on behalf of one user: default, can-use, login.

use anyhow::Result;
use console::style;

use avatarium_types::user::UserId;

use crate::cli::previous_ids;
use crate::state::AppState;

/// Pick a default avatar. `avatar = None` goes back to the personal avatar;
/// `none = true` shows no avatar by default.
pub fn choose_default(
    state: &mut AppState,
    user: &str,
    avatar: Option<&str>,
    none: bool,
    previous: &[String],
    json: bool,
) -> Result<()> {
    let user = UserId::parse(user)?;
    let previous = previous_ids(previous);

    let changed = if none {
        state.service.set_default(&user, None)
    } else {
        state.service.choose_default(&user, &previous, avatar)?
    };
    let current = state.service.default_avatar(&user);

    if json {
        println!(
            "{}",
            serde_json::json!({"user": user, "changed": changed, "default": current})
        );
        return Ok(());
    }

    let shown = current
        .as_ref()
        .map(|a| style(a.to_string()).cyan().to_string())
        .unwrap_or_else(|| style("none").dim().to_string());
    if changed {
        println!(
            "  {} Default avatar for {} is now {}",
            style("✓").green().bold(),
            style(&user).bold(),
            shown
        );
    } else {
        println!(
            "  {} Default avatar for {} is already {}",
            style("i").blue().bold(),
            style(&user).bold(),
            shown
        );
    }
    Ok(())
}

/// Report the stored form of the avatar the user may use, if any.
pub fn can_use(
    state: &AppState,
    user: &str,
    avatar: &str,
    previous: &[String],
    json: bool,
) -> Result<()> {
    let user = UserId::parse(user)?;
    let resolved = state
        .service
        .resolve_for_user(&user, &previous_ids(previous), avatar);

    if json {
        println!(
            "{}",
            serde_json::json!({"user": user, "avatar": avatar, "allowed": resolved.is_some(), "resolved": resolved})
        );
    } else {
        match resolved {
            Some(resolved) => println!(
                "  {} {} may use '{}'",
                style("✓").green().bold(),
                style(&user).bold(),
                style(resolved).cyan()
            ),
            None => println!(
                "  {} {} may not use '{}'",
                style("✗").red().bold(),
                style(&user).bold(),
                avatar
            ),
        }
    }
    Ok(())
}

/// Simulate the user coming online so a pending grant notice is delivered.
pub fn login(state: &mut AppState, user: &str, json: bool) -> Result<()> {
    let user = UserId::parse(user)?;
    state.service.messenger().set_online(&user);
    let delivered = state.service.on_user_online(&user);

    let messages: Vec<String> = state
        .service
        .messenger()
        .delivered()
        .iter()
        .filter(|notice| notice.user == user)
        .map(|notice| notice.message())
        .collect();

    if json {
        println!(
            "{}",
            serde_json::json!({"user": user, "notified": delivered, "messages": messages})
        );
    } else if delivered {
        for message in &messages {
            println!("  {} [to {}] {}", style("✉").cyan(), style(&user).bold(), message);
        }
    } else {
        println!(
            "  {} No pending avatar notice for {}",
            style("i").blue().bold(),
            style(&user).bold()
        );
    }
    Ok(())
}
