use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dir-merge")]
#[command(about = "Compare directory trees and merge them into one", long_about = None)]
pub struct Cli {
    /// Configuration file to use instead of ./Config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Index and classify the directories, then write reports
    Analyze {
        /// Directories to compare (defaults to root_paths from the configuration)
        dirs: Vec<PathBuf>,
    },
    /// Resolve every relation group and build a merged tree
    Merge {
        /// Directories to merge (defaults to root_paths from the configuration)
        dirs: Vec<PathBuf>,
        /// Directory the merged tree is written to; must not exist yet
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Strategy::Interactive)]
        strategy: Strategy,
        /// Write the merge plan without copying any files
        #[arg(long)]
        dry_run: bool,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Ask for a decision on every group
    Interactive,
    /// Keep the first member of every group
    KeepFirst,
    /// Keep every member, renaming on collision
    KeepAll,
}
