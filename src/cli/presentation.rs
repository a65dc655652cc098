//! CLI presentation: text and json formatters per command family.

mod analysis;
mod context;
mod path;
mod shared;

pub use analysis::{format_comparison, format_pattern_report};
pub use context::{
    format_context_list, format_context_show, format_import_report, format_switch_result,
    format_visualization,
};
pub use path::{format_path_list, format_path_show, format_replay};
pub use shared::{format_node_ranking, format_timestamp};
