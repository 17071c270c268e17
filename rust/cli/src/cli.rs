//! Command-line surface of the `banker` binary.

use clap::{Parser, Subcommand};

use crate::validation::{parse_ratio, parse_sessions};

#[derive(Parser, Debug)]
#[command(name = "banker", version, about = "Banker: open containers, weigh offers, walk away")]
pub struct BankerCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play one interactive session on stdin
    Play {
        #[arg(long)]
        seed: Option<u64>,
        /// Append the finished session to this JSONL file
        #[arg(long)]
        log: Option<String>,
    },
    /// Run automated sessions with a threshold strategy
    Sim {
        #[arg(long, value_parser = parse_sessions)]
        sessions: u64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        output: Option<String>,
        /// Accept an offer worth at least this share of the expected value
        #[arg(long, value_parser = parse_ratio)]
        accept_ratio: Option<f64>,
    },
    /// Summarize a session log
    Stats {
        #[arg(long)]
        input: String,
    },
    /// Show resolved configuration and where each value came from
    Cfg,
    /// Print the denomination table
    Values,
}
