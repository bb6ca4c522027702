use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "docket",
    about = "Docket: sequence-indexed document catalog",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot file of the key/value store (overrides the config file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize the document counter
    Init(InitArgs),
    /// Write a value under a key
    Write(WriteArgs),
    /// Write a document and register its descriptor under the next sequence number
    Register(RegisterArgs),
    /// Read the value stored under a key
    Read(ReadArgs),
    /// List registered descriptors, optionally one page at a time
    List(ListArgs),
    /// Show the number of registered documents
    Count(CountArgs),
}

#[derive(Args)]
pub struct InitArgs {
    pub count: Option<u64>,
}

#[derive(Args)]
pub struct WriteArgs {
    pub key: String,
    pub value: String,
}

#[derive(Args)]
pub struct RegisterArgs {
    pub key: String,
    pub value: String,
    pub descriptor: String,
}

#[derive(Args)]
pub struct ReadArgs {
    pub key: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// 1-based page number; 0 or less lists everything
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    pub page: String,
    /// Documents per page; 0 or less uses the configured default
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    pub size: String,
}

#[derive(Args)]
pub struct CountArgs {}
