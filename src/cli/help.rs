//! CLI command-name contract for logging, and which commands write state.

use crate::cli::parse::{Commands, ContextCommands, PathCommands};

/// Command name string for log events (e.g. "context.switch", "path.replay").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Context { command } => format!("context.{}", context_command_name(command)),
        Commands::Path { command } => format!("path.{}", path_command_name(command)),
        Commands::Analyze => "analyze".to_string(),
        Commands::Import { .. } => "import".to_string(),
        Commands::Config => "config".to_string(),
    }
}

pub fn context_command_name(command: &ContextCommands) -> &'static str {
    match command {
        ContextCommands::Create { .. } => "create",
        ContextCommands::List => "list",
        ContextCommands::Show { .. } => "show",
        ContextCommands::Switch { .. } => "switch",
        ContextCommands::AddNode { .. } => "add_node",
        ContextCommands::Link { .. } => "link",
        ContextCommands::Focus { .. } => "focus",
        ContextCommands::Top { .. } => "top",
        ContextCommands::Scheme { .. } => "scheme",
        ContextCommands::Tag { .. } => "tag",
        ContextCommands::Note { .. } => "note",
        ContextCommands::Flag { .. } => "flag",
        ContextCommands::Recent { .. } => "recent",
        ContextCommands::Visualize { .. } => "visualize",
        ContextCommands::Compare { .. } => "compare",
    }
}

pub fn path_command_name(command: &PathCommands) -> &'static str {
    match command {
        PathCommands::Create { .. } => "create",
        PathCommands::List => "list",
        PathCommands::Show { .. } => "show",
        PathCommands::Tag { .. } => "tag",
        PathCommands::Record { .. } => "record",
        PathCommands::Stop => "stop",
        PathCommands::Replay { .. } => "replay",
    }
}

/// Whether a successful run must be saved. `top` and `compare` re-rank
/// nodes, which updates stored priorities.
pub fn writes_state(command: &Commands) -> bool {
    match command {
        Commands::Context { command } => !matches!(
            command,
            ContextCommands::List
                | ContextCommands::Show { .. }
                | ContextCommands::Recent { .. }
                | ContextCommands::Visualize { .. }
        ),
        Commands::Path { command } => {
            !matches!(command, PathCommands::List | PathCommands::Show { .. })
        }
        Commands::Analyze | Commands::Config => false,
        Commands::Import { .. } => true,
    }
}
