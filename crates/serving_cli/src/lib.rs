//! Terminal front end for the serving client.
pub mod app;
pub mod cli;
pub mod config;
pub mod inputs;
pub mod render;

pub use app::{App, Autopilot, RunOutcome, Step};
pub use cli::{Cli, Commands};
pub use config::{ClientConfig, ConfigOverrides, DEFAULT_CONFIG_FILE};
pub use inputs::{load_inputs, parse_input, parse_resource_id, InputArg};
