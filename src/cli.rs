use clap::Parser;

pub const DEFAULT_CONFIG_PATH: &str = "notion-tasks.toml";

/// notion-tasks: show open and overdue tasks from a Notion data source
#[derive(Parser, Debug, Clone)]
#[command(name = "notion-tasks", version, about)]
pub struct Cli {
    /// Fetch and render once, then exit
    #[arg(long)]
    pub once: bool,

    /// Print the fetched tasks as JSON instead of rendering them (implies --once)
    #[arg(long)]
    pub json: bool,

    /// Print the query that would be sent to Notion, without sending it
    #[arg(long, conflicts_with_all = ["once", "json"])]
    pub dry_run: bool,

    /// Milliseconds between fetch cycles
    #[arg(long, value_name = "MS")]
    pub update_interval: Option<u64>,

    /// Notion data source to query
    #[arg(long)]
    pub data_source_id: Option<String>,

    /// Timezone for "today" (IANA name, or "local")
    #[arg(long)]
    pub timezone: Option<String>,

    /// Assignee name format (full, first, last, initials)
    #[arg(long)]
    pub name_format: Option<String>,

    /// Path to config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
}
