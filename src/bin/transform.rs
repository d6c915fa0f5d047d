//! Spec Transform CLI
//!
//! Rebuilds the canonical CSV from the wiki and the JavaScript modules from
//! the CSV, or checks that the committed CSV is current.

use std::path::PathBuf;

use analytics_specs::{check_csv, generate_javascript, transform_wiki_to_csv, SpecsConfig};
use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "specs-transform")]
#[command(about = "Transform wiki tables into canonical CSV and JavaScript modules")]
struct Cli {
    /// Only regenerate the CSV files
    #[arg(long, conflicts_with = "js_only")]
    csv_only: bool,

    /// Only regenerate the JavaScript modules from existing CSV
    #[arg(long)]
    js_only: bool,

    /// Check that the CSV files match the wiki without writing anything
    #[arg(long, conflicts_with_all = ["csv_only", "js_only"])]
    check: bool,

    /// Config file to layer over the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project root that relative paths resolve against
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
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

fn run(cli: Cli) -> Result<()> {
    let config = SpecsConfig::load_from(cli.config.as_deref())?;
    let csv_dir = config.csv_dir(&cli.root);

    if cli.check {
        let wiki_dir = config.wiki_dir(&cli.root)?;
        let stale = check_csv(&wiki_dir, &csv_dir)?;
        if stale.is_empty() {
            println!("✅ CSV is up to date with {}", wiki_dir.display());
            return Ok(());
        }
        for file in &stale {
            println!("❌ {} is out of date", file.path.display());
            println!("{}", file.diff);
        }
        bail!("{} CSV file(s) out of date; run specs-transform --csv-only", stale.len());
    }

    if !cli.js_only {
        let wiki_dir = config.wiki_dir(&cli.root)?;
        println!("📖 Reading wiki from {}", wiki_dir.display());
        let summary = transform_wiki_to_csv(&wiki_dir, &csv_dir)?;
        println!(
            "✅ Wrote {} properties, {} property groups, {} events to {}",
            summary.properties.len(),
            summary.property_groups.len(),
            summary.events.len(),
            csv_dir.display()
        );
    }

    if !cli.csv_only {
        let js_dir = config.javascript_dir(&cli.root);
        let summary = generate_javascript(&csv_dir, &js_dir)?;
        println!(
            "✅ Generated {} property, {} property group and {} event modules in {} tables under {}",
            summary.properties,
            summary.groups,
            summary.events,
            summary.tables,
            js_dir.display()
        );
    }

    Ok(())
}
