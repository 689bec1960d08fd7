use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "scholarbot")]
#[command(version = "0.1.0")]
#[command(about = "Discord bot tracking Axie scholar MMR leaderboards", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory
    #[arg(short, long, default_value = "config")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect to Discord and serve commands
    Run,
    /// Fetch the leaderboard once and print it to stdout
    Top,
    /// Inspect or mutate the roster without connecting
    Roster {
        #[command(subcommand)]
        action: RosterAction,
    },
}

#[derive(Subcommand)]
pub enum RosterAction {
    /// Add a scholar
    Add {
        /// Ronin account address
        id: String,
        /// Display name
        #[arg(default_value = "")]
        name: String,
    },
    /// Remove a scholar by address or display name
    Remove { key: String },
    /// List the roster
    List,
}
