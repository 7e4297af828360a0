//! Command-line arguments using clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serving_logging::LogDestination;

/// Client for a model-serving backend.
///
/// Stages inputs, uploads them, launches a job against a named model and
/// follows it until the result is available.
#[derive(Parser, Debug)]
#[command(name = "serving-client")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// RON config file (defaults to ./serving_client.ron when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Write logs to this file (also to the terminal with -v)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload inputs, run a job and print its result
    Run {
        /// Model name to run against
        #[arg(short, long)]
        model: Option<String>,

        /// Milliseconds between job status polls
        #[arg(long)]
        poll_interval_ms: Option<u64>,

        /// Text values, or @path to stage a file (@@text for a literal '@')
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<String>,
    },

    /// List the models known to the backend
    Models,

    /// Show one model
    Model {
        /// Model id
        id: String,
    },

    /// List jobs
    Jobs {
        #[arg(long, default_value_t = 0)]
        skip: u32,

        #[arg(long, default_value_t = 100)]
        limit: u32,
    },

    /// Show one job snapshot
    Job {
        /// Job id
        id: String,
    },

    /// Print one result text
    Result {
        /// Result path as reported by a completed job
        path: String,
    },

    /// Print the effective configuration as RON
    Config,
}

impl Cli {
    /// `--log-file` alone logs to the file only; with `-v` it also logs
    /// to the terminal.
    pub fn log_destination(&self) -> LogDestination {
        match (&self.log_file, self.verbose) {
            (None, _) => LogDestination::Terminal,
            (Some(path), 0) => LogDestination::File(path.clone()),
            (Some(path), _) => LogDestination::Both(path.clone()),
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
