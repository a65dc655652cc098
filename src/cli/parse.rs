//! CLI parse: clap types for Pathfinder. No behavior; definitions only.

use crate::priority::PriorityType;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

/// Pathfinder CLI - navigate graph data through contexts and recorded paths
#[derive(Parser)]
#[command(name = "pathfinder")]
#[command(about = "Navigate graph data through named contexts and recorded paths")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// State directory (overrides storage.root from config)
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// Workspace root directory, searched for config/config.toml
    #[arg(long, default_value = ".", global = true)]
    pub workspace: PathBuf,

    /// Additional configuration file, layered above workspace config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Enable verbose logging (default: off)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, inspect and edit contexts
    Context {
        #[command(subcommand)]
        command: ContextCommands,
    },
    /// Create, record and replay paths
    Path {
        #[command(subcommand)]
        command: PathCommands,
    },
    /// Transition statistics and cycles across all paths
    Analyze,
    /// Import rows of one label from a JSON graph file into the current context
    Import {
        /// Label to import
        label: String,
        /// JSON document shaped {"Label": [{...}, ...]}
        #[arg(long)]
        file: PathBuf,
        /// Maximum rows (default: import.default_limit)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Subcommand)]
pub enum ContextCommands {
    /// Create a context
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List contexts
    List,
    /// Show one context with its nodes
    Show { context: String },
    /// Make a context current, optionally carrying nodes from the current one
    Switch {
        context: String,
        #[arg(long, default_value = "Manual switch")]
        reason: String,
        /// Node ids to carry (comma separated or repeated)
        #[arg(long = "carry", value_delimiter = ',')]
        carry: Vec<String>,
    },
    /// Add or overwrite a node
    AddNode {
        context: String,
        id: String,
        /// Node label (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,
        /// Property as key=value; the value is parsed as JSON when possible
        #[arg(long = "prop", value_parser = parse_key_value)]
        properties: Vec<(String, Value)>,
        #[arg(long)]
        relevance: Option<f64>,
    },
    /// Add a directed relationship between two nodes
    Link {
        context: String,
        source: String,
        target: String,
        rel_type: String,
    },
    /// Replace the focus list
    Focus { context: String, nodes: Vec<String> },
    /// Highest-priority nodes under the context's scheme
    Top {
        context: String,
        #[arg(short, long, default_value = "5")]
        n: usize,
    },
    /// Set the ranking scheme (recency, frequency, relevance, centrality)
    Scheme {
        context: String,
        #[arg(value_parser = parse_scheme)]
        scheme: PriorityType,
    },
    /// Tag a context
    Tag { context: String, tag: String },
    /// Attach a note to a node
    Note {
        context: String,
        node: String,
        note: String,
    },
    /// Flag a node
    Flag {
        context: String,
        node: String,
        flag: String,
    },
    /// Most recently accessed contexts
    Recent {
        #[arg(default_value = "5")]
        n: usize,
    },
    /// Renderer payload for a context (default: current)
    Visualize { context: Option<String> },
    /// Compare two contexts
    Compare { first: String, second: String },
}

#[derive(Subcommand)]
pub enum PathCommands {
    /// Create a path
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List paths
    List,
    /// Show one path with its transitions
    Show { path: String },
    /// Tag a path
    Tag { path: String, tag: String },
    /// Start recording switches into a path
    Record { path: String },
    /// Stop recording
    Stop,
    /// Replay a path's switches
    Replay {
        path: String,
        /// Pause between steps (default: replay.step_interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Replay without pausing
        #[arg(long)]
        no_pause: bool,
    },
}

pub(crate) fn parse_key_value(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))?;
    if key.is_empty() {
        return Err(format!("empty key in `{}`", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn parse_scheme(raw: &str) -> Result<PriorityType, String> {
    raw.parse().map_err(|e: crate::error::PathfinderError| e.to_string())
}
