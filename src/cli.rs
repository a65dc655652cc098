//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to the manager.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, writes_state};
pub use output::map_error;
pub use parse::{Cli, Commands, ContextCommands, OutputFormat, PathCommands};
pub use presentation::{format_node_ranking, format_timestamp};
pub use route::RunContext;
