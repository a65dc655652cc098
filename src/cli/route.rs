//! CLI route: single route table and run context. Dispatches to the manager and presentation.

use crate::cli::help::{command_name, writes_state};
use crate::cli::parse::{Commands, ContextCommands, OutputFormat, PathCommands};
use crate::cli::presentation::{
    format_comparison, format_context_list, format_context_show, format_import_report,
    format_node_ranking, format_path_list, format_path_show, format_pattern_report, format_replay,
    format_switch_result, format_visualization,
};
use crate::config::{ConfigLoader, PathfinderConfig};
use crate::error::PathfinderError;
use crate::manager::ContextManager;
use crate::model::{Context, Node, PathRoute};
use crate::replay::drive_paced;
use crate::source::JsonFileSource;
use serde_json::Map;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Runtime context for CLI execution: resolved configuration and output format.
/// Every command loads state through the configured store and saves it back
/// when the command changed it.
pub struct RunContext {
    config: PathfinderConfig,
    format: OutputFormat,
}

impl RunContext {
    /// Resolve configuration for `workspace_root`, layering `config_path`
    /// when given; `storage` overrides `storage.root`.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        storage: Option<PathBuf>,
        format: OutputFormat,
    ) -> Result<Self, PathfinderError> {
        let mut config = ConfigLoader::load_with(&workspace_root, config_path.as_deref())?;
        if let Some(root) = storage {
            config.storage.root = root;
        }
        Ok(Self {
            config: config.validated()?,
            format,
        })
    }

    pub fn from_config(config: PathfinderConfig, format: OutputFormat) -> Self {
        Self { config, format }
    }

    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, PathfinderError> {
        let started = Instant::now();
        let name = command_name(command);
        if let Commands::Config = command {
            return self.render_config();
        }
        let mut manager = ContextManager::from_config(&self.config)?;

        let output = self.execute_inner(&mut manager, command)?;
        if writes_state(command) {
            manager.save()?;
        }
        info!(command = %name, elapsed_ms = started.elapsed().as_millis() as u64, "Command completed");
        Ok(output)
    }

    fn execute_inner(&self, manager: &mut ContextManager, command: &Commands) -> Result<String, PathfinderError> {
        match command {
            Commands::Context { command } => self.handle_context_command(manager, command),
            Commands::Path { command } => self.handle_path_command(manager, command),
            Commands::Analyze => format_pattern_report(&manager.analyze_context_patterns(), self.format),
            Commands::Import { label, file, limit } => {
                let source = JsonFileSource::new(file);
                let report = manager.import_from_source(&source, label, *limit)?;
                format_import_report(&report, self.format)
            }
            Commands::Config => self.render_config(),
        }
    }

    fn handle_context_command(
        &self,
        manager: &mut ContextManager,
        command: &ContextCommands,
    ) -> Result<String, PathfinderError> {
        match command {
            ContextCommands::Create { name, description } => {
                let context = manager.create_context(name, description);
                self.created("context", &context.id, &context.name)
            }
            ContextCommands::List => {
                let contexts: Vec<&Context> = manager.contexts().collect();
                format_context_list(&contexts, manager.current_context_id(), self.format)
            }
            ContextCommands::Show { context } => {
                let context = manager
                    .context(context)
                    .ok_or_else(|| PathfinderError::context_not_found(context))?;
                format_context_show(context, self.format)
            }
            ContextCommands::Switch { context, reason, carry } => {
                let context = manager.switch_context(context, reason, carry)?;
                format_switch_result(context, self.format)
            }
            ContextCommands::AddNode {
                context,
                id,
                labels,
                properties,
                relevance,
            } => {
                let properties: Map<_, _> = properties.iter().cloned().collect();
                let mut node = Node::new(id.clone(), labels.clone(), properties);
                if let Some(relevance) = relevance {
                    node = node.with_relevance(*relevance);
                }
                let node = manager.add_node(context, node)?;
                let text = node.read().to_string();
                Ok(format!("Added node {}", text))
            }
            ContextCommands::Link {
                context,
                source,
                target,
                rel_type,
            } => {
                let id = manager.add_relationship(context, source, target, rel_type, None)?;
                Ok(format!("Added relationship {} ({} {} {})", id, source, rel_type, target))
            }
            ContextCommands::Focus { context, nodes } => {
                manager.set_focus(context, nodes.clone())?;
                let context = manager
                    .context(context)
                    .ok_or_else(|| PathfinderError::context_not_found(context))?;
                Ok(context.accessibility_description().to_string())
            }
            ContextCommands::Top { context, n } => {
                let nodes = manager.top_nodes(context, *n)?;
                format_node_ranking(&nodes, self.format)
            }
            ContextCommands::Scheme { context, scheme } => {
                manager.set_priority_scheme(context, *scheme, None)?;
                Ok(format!("Priority scheme set to {}", scheme))
            }
            ContextCommands::Tag { context, tag } => {
                manager.tag_context(context, tag)?;
                Ok(format!("Tagged context {} with {}", context, tag))
            }
            ContextCommands::Note { context, node, note } => {
                manager.annotate_node(context, node, note)?;
                Ok(format!("Added note to node {}", node))
            }
            ContextCommands::Flag { context, node, flag } => {
                manager.flag_node(context, node, flag)?;
                Ok(format!("Flagged node {} as {}", node, flag))
            }
            ContextCommands::Recent { n } => {
                let contexts = manager.recent_contexts(*n);
                format_context_list(&contexts, manager.current_context_id(), self.format)
            }
            ContextCommands::Visualize { context } => {
                format_visualization(&manager.visualize(context.as_deref())?)
            }
            ContextCommands::Compare { first, second } => {
                format_comparison(&manager.compare_contexts(first, second)?, self.format)
            }
        }
    }

    fn handle_path_command(
        &self,
        manager: &mut ContextManager,
        command: &PathCommands,
    ) -> Result<String, PathfinderError> {
        match command {
            PathCommands::Create { name, description } => {
                let path = manager.create_path(name, description);
                self.created("path", &path.id, &path.name)
            }
            PathCommands::List => {
                let paths: Vec<&PathRoute> = manager.paths().collect();
                format_path_list(&paths, manager.recording_path_id(), self.format)
            }
            PathCommands::Show { path } => {
                let route = manager
                    .path(path)
                    .ok_or_else(|| PathfinderError::path_not_found(path))?;
                format_path_show(
                    route,
                    |id| manager.context(id).map(|c| c.name.as_str()),
                    self.format,
                )
            }
            PathCommands::Tag { path, tag } => {
                manager.tag_path(path, tag)?;
                Ok(format!("Tagged path {} with {}", path, tag))
            }
            PathCommands::Record { path } => {
                manager.start_recording(path)?;
                Ok(format!("Recording context switches into path {}", path))
            }
            PathCommands::Stop => Ok(match manager.stop_recording() {
                Some(path_id) => format!("Stopped recording path {}", path_id),
                None => "Not recording".to_string(),
            }),
            PathCommands::Replay {
                path,
                interval_ms,
                no_pause,
            } => self.replay(manager, path, *interval_ms, *no_pause),
        }
    }

    fn replay(
        &self,
        manager: &mut ContextManager,
        path_id: &str,
        interval_ms: Option<u64>,
        no_pause: bool,
    ) -> Result<String, PathfinderError> {
        let mut visited = Vec::new();
        let outcome = if no_pause {
            manager.replay_path(path_id, |ctx| visited.push(ctx.to_string()))?
        } else {
            let interval = interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| manager.replay_interval());
            let mut session = manager.start_replay(path_id)?;
            debug!(path_id, steps = session.len(), interval_ms = interval.as_millis() as u64, "Paced replay");
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .map_err(|e| PathfinderError::Config(format!("Failed to start replay runtime: {}", e)))?;
            runtime.block_on(drive_paced(manager, &mut session, interval, |ctx| {
                visited.push(ctx.to_string())
            }))?
        };
        format_replay(path_id, &visited, &outcome, self.format)
    }

    fn render_config(&self) -> Result<String, PathfinderError> {
        toml::to_string_pretty(&self.config)
            .map_err(|e| PathfinderError::Config(format!("Failed to render configuration: {}", e)))
    }

    fn created(&self, kind: &str, id: &str, name: &str) -> Result<String, PathfinderError> {
        if self.format == OutputFormat::Json {
            return crate::cli::output::to_json(&serde_json::json!({ "id": id, "name": name }), "created");
        }
        Ok(format!("Created {} {} ({})", kind, name, id))
    }
}
