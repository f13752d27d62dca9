//! CLI command definitions for the `avatarctl` binary.
//!
//! Operator commands change grants; the user-facing commands (`default`,
//! `can-use`, `login`) act on behalf of one user.

pub mod grant;
pub mod query;
pub mod user;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use avatarium_observe::LogFormat;

/// Manage custom avatar grants.
#[derive(Parser)]
#[command(name = "avatarctl", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format on stderr (text or json).
    #[arg(long, global = true, default_value = "text", env = "AVATARIUM_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Grant a personal avatar to a user.
    Grant {
        user: String,
        /// `#name` for mirror avatars, `name.png` for hosted files.
        avatar: String,
    },

    /// Grant an avatar to several users at once.
    Allow {
        avatar: String,
        #[arg(required = true, num_args = 1..)]
        users: Vec<String>,
    },

    /// Take one avatar away from a user.
    #[command(alias = "rm")]
    Revoke { user: String, avatar: String },

    /// Take one avatar away from several users.
    #[command(name = "revoke-group")]
    RevokeGroup {
        avatar: String,
        #[arg(required = true, num_args = 1..)]
        users: Vec<String>,
    },

    /// Move every grant from one account to another.
    #[command(name = "move")]
    Move { from: String, to: String },

    /// Pick a user's default avatar. Omit the avatar to go back to the personal one.
    Default {
        user: String,
        avatar: Option<String>,
        /// Show no avatar by default.
        #[arg(long, conflicts_with = "avatar")]
        none: bool,
        /// Previous names of the user whose grants also count.
        #[arg(long = "previous", value_name = "USER")]
        previous: Vec<String>,
    },

    /// Check whether a user may use an avatar.
    #[command(name = "can-use")]
    CanUse {
        user: String,
        avatar: String,
        #[arg(long = "previous", value_name = "USER")]
        previous: Vec<String>,
    },

    /// Mark a user online and deliver any pending grant notice.
    Login { user: String },

    /// Show one user's grants.
    Show { user: String },

    /// List all grants, or only the holders of one avatar.
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        avatar: Option<String>,
    },

    /// Describe an avatar: kind, sprite URL, artist, and whether it exists.
    Info { avatar: String },

    /// Data directory, record file and store summary.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Normalize `--previous` names, dropping ones that normalize to nothing.
pub(crate) fn previous_ids(raw: &[String]) -> Vec<avatarium_types::user::UserId> {
    raw.iter()
        .map(|name| avatarium_types::user::UserId::normalize(name))
        .filter(|id| !id.is_empty())
        .collect()
}
