// Command-line interface

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::score::{combine_players, GameMeta};

#[derive(Debug, Parser)]
#[command(name = "scorelink", version, about = "Push live match scores to a display server on the LAN")]
pub struct Cli {
    /// Config file (default: ~/.scorelink/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover the display server and print status changes until Ctrl-C
    Watch,
    /// Discover the display server and push one score snapshot
    Push(PushArgs),
    /// Operator console: a+ / a- / b+ / b- / reset / status / quit
    Run(MetaArgs),
}

#[derive(Debug, Args)]
pub struct PushArgs {
    #[arg(long)]
    pub team_a_score: u32,

    #[arg(long)]
    pub team_b_score: u32,

    /// Seconds to wait for the display server to be discovered
    #[arg(long, default_value_t = 10)]
    pub wait_secs: u64,

    #[command(flatten)]
    pub meta: MetaArgs,
}

#[derive(Debug, Clone, Default, Args)]
pub struct MetaArgs {
    #[arg(long, default_value = "")]
    pub team_a: String,

    #[arg(long, default_value = "")]
    pub team_b: String,

    /// One player, or two for a doubles lineup
    #[arg(long, num_args = 1..=2, value_name = "PLAYER")]
    pub team_a_player: Vec<String>,

    /// One player, or two for a doubles lineup
    #[arg(long, num_args = 1..=2, value_name = "PLAYER")]
    pub team_b_player: Vec<String>,

    /// Overrides game.event_name from the config
    #[arg(long)]
    pub event: Option<String>,
}

impl MetaArgs {
    pub fn into_meta(self, default_event: &str) -> GameMeta {
        GameMeta {
            team_a: self.team_a,
            team_b: self.team_b,
            team_a_player: lineup(&self.team_a_player),
            team_b_player: lineup(&self.team_b_player),
            event_name: self.event.unwrap_or_else(|| default_event.to_string()),
        }
    }
}

fn lineup(players: &[String]) -> String {
    match players {
        [] => String::new(),
        [single] => combine_players(single, ""),
        [first, second, ..] => combine_players(first, second),
    }
}
