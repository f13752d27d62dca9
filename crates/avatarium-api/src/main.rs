//! Avatarium operator CLI.
//!
//! Binary name: `avatarctl`
//!
//! Parses CLI arguments, loads the avatar record (migrating legacy settings on
//! first run), dispatches the command, then flushes pending writes.

mod cli;
mod messenger;
mod state;

use clap::Parser;
use clap_complete::generate;
use console::style;

use avatarium_observe::{init_tracing, shutdown_tracing};
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(cli.log_format, log_filter(cli.verbose, cli.quiet), cli.otel) {
        eprintln!("Warning: failed to initialize logging: {err}");
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "avatarctl", &mut std::io::stdout());
        return Ok(());
    }

    let mut state = AppState::init().await?;
    if let Some(warning) = state.report.operator_warning() {
        tracing::warn!("{warning}");
        if !cli.quiet && !cli.json {
            eprintln!("  {} {warning}", style("!").yellow().bold());
        }
    }

    let result = run(&mut state, cli.command, cli.json).await;

    state.shutdown().await;
    shutdown_tracing();
    result
}

/// Default tracing directive for the `-v` count.
///
/// Targets are crate module paths (`avatarctl` for this binary), so each
/// crate that logs is named.
fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info,avatarium_core=debug,avatarium_infra=debug,avatarctl=debug",
        _ => "trace",
    }
}

async fn run(state: &mut AppState, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Grant { user, avatar } => cli::grant::grant(state, &user, &avatar, json).await,
        Commands::Allow { avatar, users } => cli::grant::allow(state, &avatar, &users, json).await,
        Commands::Revoke { user, avatar } => cli::grant::revoke(state, &user, &avatar, json),
        Commands::RevokeGroup { avatar, users } => {
            cli::grant::revoke_group(state, &avatar, &users, json)
        }
        Commands::Move { from, to } => cli::grant::move_avatars(state, &from, &to, json),
        Commands::Default {
            user,
            avatar,
            none,
            previous,
        } => cli::user::choose_default(state, &user, avatar.as_deref(), none, &previous, json),
        Commands::CanUse {
            user,
            avatar,
            previous,
        } => cli::user::can_use(state, &user, &avatar, &previous, json),
        Commands::Login { user } => cli::user::login(state, &user, json),
        Commands::Show { user } => cli::query::show(state, &user, json),
        Commands::List { avatar } => cli::query::list(state, avatar.as_deref(), json),
        Commands::Info { avatar } => cli::query::info(state, &avatar, json).await,
        Commands::Status => cli::query::status(state, json),
        Commands::Completions { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_filter_names_every_crate_target() {
        let filter = log_filter(1, false);
        for target in ["avatarium_core", "avatarium_infra", "avatarctl"] {
            assert!(
                filter.split(',').any(|directive| directive == format!("{target}=debug")),
                "{target} missing from {filter}"
            );
        }
        // a bare crate-family prefix matches no target
        assert!(!filter.split(',').any(|directive| directive == "avatarium=debug"));
    }

    #[test]
    fn quiet_and_default_levels() {
        assert_eq!(log_filter(0, true), "error");
        assert_eq!(log_filter(0, false), "warn");
        assert_eq!(log_filter(2, false), "trace");
    }
}
