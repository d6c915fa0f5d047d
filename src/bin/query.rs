//! Spec Query CLI
//!
//! Runs the query tools and reads resources against the canonical CSV,
//! printing JSON to stdout.

use std::path::PathBuf;

use analytics_specs::query::{call_tool, list_resources, read_resource, render_response, tool_catalogue};
use analytics_specs::{staleness_warning, SpecRepository, SpecsConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "specs-query")]
#[command(about = "Query analytics event specs")]
struct Cli {
    /// Directory holding the canonical CSV (overrides config)
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Config file to layer over the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project root that relative paths resolve against
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Skip the upstream staleness check
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full event spec with property groups expanded
    Event { name: String },

    /// Validate a JSON payload against an event
    Validate {
        name: String,
        /// Payload as a JSON object
        payload: String,
    },

    /// Search events
    Search {
        /// Substring of the event name or description
        #[arg(short, long)]
        query: Option<String>,
        /// Substring of the event table
        #[arg(short, long)]
        table: Option<String>,
        /// Property the event must include
        #[arg(long)]
        has_property: Option<String>,
    },

    /// Property definition and where it is used
    Property { name: String },

    /// Events in the same table
    Related { name: String },

    /// Call a tool by name with JSON arguments
    Call {
        tool: String,
        #[arg(default_value = "{}")]
        args: String,
    },

    /// List the tool catalogue
    Tools,

    /// List resources
    Resources,

    /// Read a resource by URI
    Read { uri: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn parse_json(text: &str, what: &str) -> Result<Value> {
    serde_json::from_str(text).with_context(|| format!("{} is not valid JSON", what))
}

fn search_args(query: Option<String>, table: Option<String>, has_property: Option<String>) -> Value {
    let mut args = Map::new();
    for (key, value) in [("query", query), ("table", table), ("has_property", has_property)] {
        if let Some(value) = value {
            args.insert(key.to_string(), Value::String(value));
        }
    }
    Value::Object(args)
}

fn query(repo: &SpecRepository, command: Commands) -> Result<Value> {
    let result = match command {
        Commands::Event { name } => call_tool(repo, "get_event_implementation", json!({ "event_name": name }))?,
        Commands::Validate { name, payload } => {
            let payload = parse_json(&payload, "payload")?;
            call_tool(repo, "validate_event_payload", json!({ "event_name": name, "payload": payload }))?
        }
        Commands::Search { query, table, has_property } => {
            call_tool(repo, "search_events", search_args(query, table, has_property))?
        }
        Commands::Property { name } => call_tool(repo, "get_property_details", json!({ "property_name": name }))?,
        Commands::Related { name } => call_tool(repo, "get_related_events", json!({ "event_name": name }))?,
        Commands::Call { tool, args } => call_tool(repo, &tool, parse_json(&args, "arguments")?)?,
        Commands::Tools => serde_json::to_value(tool_catalogue())?,
        Commands::Resources => serde_json::to_value(list_resources(repo))?,
        Commands::Read { uri } => read_resource(repo, &uri)?,
    };
    Ok(result)
}

fn run(cli: Cli) -> Result<()> {
    let config = SpecsConfig::load_from(cli.config.as_deref())?;

    // The catalogue does not need the CSV
    let result = match cli.command {
        Commands::Tools => serde_json::to_value(tool_catalogue())?,
        command => {
            let csv_dir = cli.csv_dir.clone().unwrap_or_else(|| config.csv_dir(&cli.root));
            let repo = SpecRepository::load(&csv_dir)
                .with_context(|| format!("loading specs from {}", csv_dir.display()))?;
            query(&repo, command)?
        }
    };

    let warning = if config.query.check_upstream && !cli.offline {
        staleness_warning(&cli.root)
    } else {
        None
    };

    println!("{}", render_response(&result, warning.as_deref(), config.query.pretty)?);
    Ok(())
}
