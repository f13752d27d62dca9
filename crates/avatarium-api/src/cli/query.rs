//! Read-only commands: show, list, info, status.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use avatarium_infra::config::store_path;
use avatarium_types::avatar::AvatarId;
use avatarium_types::entry::{AvatarEntry, DefaultAvatar};
use avatarium_types::record::EntryRecord;
use avatarium_types::user::UserId;

use crate::state::AppState;

fn default_label(entry: &AvatarEntry) -> String {
    match &entry.default {
        DefaultAvatar::Implicit => "personal".to_string(),
        DefaultAvatar::Cleared => "none".to_string(),
        DefaultAvatar::Explicit(avatar) => avatar.to_string(),
    }
}

fn format_time(time: Option<chrono::DateTime<chrono::Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Show one user's grants with their sprite URLs.
pub fn show(state: &AppState, user: &str, json: bool) -> Result<()> {
    let user = UserId::parse(user)?;
    let Some(entry) = state.service.entry(&user) else {
        if json {
            println!("{}", serde_json::json!({"user": user, "entry": null}));
        } else {
            println!(
                "  {} {} has no custom avatars",
                style("i").blue().bold(),
                style(&user).bold()
            );
        }
        return Ok(());
    };
    let current = state.service.default_avatar(&user);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "user": user,
                "entry": EntryRecord::from(entry),
                "resolvedDefault": current,
            }))?
        );
        return Ok(());
    }

    println!();
    println!("  {}", style(&user).bold().cyan());
    println!();
    for (slot, avatar) in entry.slots().into_iter().enumerate() {
        let label = if slot == 0 { "personal" } else { "allowed" };
        match avatar {
            Some(avatar) => {
                let url = state.checker.asset_url(avatar).unwrap_or_else(|| "(hosted file)".to_string());
                let marker = if current.as_ref() == Some(avatar) { "*" } else { " " };
                let credit = state
                    .service
                    .catalog()
                    .artist_of(avatar)
                    .map(|artist| format!(" (art: {artist})"))
                    .unwrap_or_default();
                println!(
                    "  {marker} {:<10} {:<24} {}{credit}",
                    label,
                    style(avatar).cyan(),
                    style(url).dim()
                );
            }
            None => println!("    {:<10} {}", label, style("(vacant)").dim()),
        }
    }
    println!();
    println!("  {:<16} {}", style("Default").dim(), default_label(entry));
    println!("  {:<16} {}", style("Received").dim(), format_time(entry.time_received));
    println!("  {:<16} {}", style("Updated").dim(), format_time(entry.time_updated));
    println!(
        "  {:<16} {}",
        style("Notice pending").dim(),
        if entry.not_notified { "yes" } else { "no" }
    );
    println!();
    Ok(())
}

/// List every entry, or the holders of one avatar.
pub fn list(state: &AppState, avatar: Option<&str>, json: bool) -> Result<()> {
    let store = state.service.store();
    let entries: Vec<(&UserId, &AvatarEntry)> = match avatar {
        Some(raw) => {
            let avatar = AvatarId::normalize(raw);
            store
                .holders_of(&avatar)
                .into_iter()
                .filter_map(|user| store.get(user).map(|entry| (user, entry)))
                .collect()
        }
        None => store.iter_sorted(),
    };

    if json {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(user, entry)| {
                Ok((user.to_string(), serde_json::to_value(EntryRecord::from(*entry))?))
            })
            .collect::<Result<_, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!();
        println!(
            "  {} No grants found. Add one with: {}",
            style("i").blue().bold(),
            style("avatarctl grant <user> '#avatar'").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("User").fg(Color::White),
        Cell::new("Personal").fg(Color::White),
        Cell::new("Allowed").fg(Color::White),
        Cell::new("Default").fg(Color::White),
        Cell::new("Received").fg(Color::White),
    ]);

    for (user, entry) in &entries {
        let extra = entry
            .extra()
            .iter()
            .map(AvatarId::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let mut user_cell = Cell::new(user.as_str()).fg(Color::Cyan);
        if entry.not_notified {
            user_cell = Cell::new(format!("{user} ✉")).fg(Color::Yellow);
        }
        table.add_row(vec![
            user_cell,
            Cell::new(entry.personal().map(AvatarId::as_str).unwrap_or("-")),
            Cell::new(extra),
            Cell::new(default_label(entry)),
            Cell::new(format_time(entry.time_received)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} user{}",
        style(entries.len()).bold(),
        if entries.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

/// Describe an avatar id and probe for its asset.
pub async fn info(state: &AppState, raw: &str, json: bool) -> Result<()> {
    let avatar = AvatarId::parse(raw)?;
    let resolver = state.service.resolver();
    let exists = resolver.exists(&avatar, &state.checker).await;
    let artist = state.service.catalog().artist_of(&avatar);
    let url = state.checker.asset_url(&avatar);
    let holders = state.service.store().holders_of(&avatar).len();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "avatar": avatar,
                "kind": avatar.kind(),
                "exists": exists,
                "url": url,
                "artist": artist,
                "holders": holders,
            })
        );
        return Ok(());
    }

    println!();
    println!("  {}", style(&avatar).bold().cyan());
    println!("  {:<10} {}", style("Kind").dim(), avatar.kind());
    println!(
        "  {:<10} {}",
        style("Exists").dim(),
        if exists {
            style("yes").green()
        } else {
            style("no").red()
        }
    );
    if let Some(url) = url {
        println!("  {:<10} {}", style("URL").dim(), url);
    }
    if let Some(artist) = artist {
        println!("  {:<10} {}", style("Artist").dim(), artist);
    }
    println!("  {:<10} {}", style("Holders").dim(), holders);
    println!();
    Ok(())
}

pub fn status(state: &AppState, json: bool) -> Result<()> {
    let record = store_path(&state.config, &state.data_dir);
    let store = state.service.store();
    let pending = store
        .iter_sorted()
        .iter()
        .filter(|(_, entry)| entry.not_notified)
        .count();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "dataDir": state.data_dir,
                "record": record,
                "users": store.len(),
                "pendingNotices": pending,
                "officialAvatars": state.service.catalog().len(),
                "mirror": state.config.sprite_mirror_url,
                "flushDebounceSecs": state.config.flush_debounce_secs,
            })
        );
        return Ok(());
    }

    println!();
    println!("  {:<18} {}", style("Data directory").dim(), state.data_dir.display());
    println!("  {:<18} {}", style("Record").dim(), record.display());
    println!("  {:<18} {}", style("Users").dim(), store.len());
    println!("  {:<18} {}", style("Pending notices").dim(), pending);
    println!(
        "  {:<18} {}",
        style("Official avatars").dim(),
        state.service.catalog().len()
    );
    println!("  {:<18} {}", style("Sprite mirror").dim(), state.config.sprite_mirror_url);
    println!("  {:<18} {}s", style("Write debounce").dim(), state.config.flush_debounce_secs);
    println!();
    Ok(())
}
