use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rusty_lab::config::DashboardConfig;
use rusty_lab::data::{export, loader};
use rusty_lab::report;
use rusty_lab::{AppState, Choice, FilterOutcome, FilterSet};

/// Filter experiments by property ranges and compare averaged results.
#[derive(Parser, Debug)]
#[command(name = "rusty-lab", version, about)]
struct Cli {
    /// Dashboard config (input schema, default data source).
    #[arg(long, env = "RUSTY_LAB_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset path or http(s) URL; overrides the config.
    #[arg(long)]
    data: Option<String>,

    /// Range filter, e.g. `input:Temperature=10..20` or `output:Yield=5..`.
    #[arg(long = "filter", value_name = "SPEC")]
    filters: Vec<String>,

    /// First comparison slot: an experiment ID or `avg`.
    #[arg(long)]
    choice1: Option<Choice>,

    /// Second comparison slot.
    #[arg(long)]
    choice2: Option<Choice>,

    /// Print every matching experiment with its values.
    #[arg(long)]
    list: bool,

    /// Write the matching experiments to a CSV file.
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Write the chart series to a CSV file.
    #[arg(long, value_name = "PATH")]
    chart_csv: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = DashboardConfig::load(cli.config.as_deref())?;
    let source = cli
        .data
        .or(config.data_source)
        .context("no data source: pass --data or set data_source in the config")?;

    let dataset = loader::load_source(&source)?;
    log::info!(
        "Loaded {} experiments with outputs {:?}",
        dataset.len(),
        dataset.output_names()
    );
    if dataset.is_empty() {
        println!("Dataset {source} contains no experiments.");
        return Ok(());
    }
    for drift in config.input_schema.check_against(&dataset) {
        log::warn!(
            "Experiment {} lacks schema inputs {:?}",
            drift.experiment_id,
            drift.missing
        );
    }

    let mut state = AppState::default();
    state.set_dataset(dataset);

    let mut filters = FilterSet::new();
    for spec in &cli.filters {
        filters.push_resolved(spec, &config.input_schema, state.dataset()?)?;
    }
    match state.apply_filters(filters)? {
        FilterOutcome::Cleared(n) => println!("Showing all {n} experiments"),
        FilterOutcome::Matched(n) => println!("{n} matching experiments"),
        FilterOutcome::NoMatches => {
            if let Some(msg) = &state.status_message {
                println!("{msg}");
            }
        }
    }

    state.set_choice(0, cli.choice1.unwrap_or_default())?;
    state.set_choice(1, cli.choice2.unwrap_or_default())?;

    let dataset = state.dataset()?;
    let ids = state.filtered_ids()?;
    if cli.list {
        print!("{}", report::experiment_details(dataset, ids)?);
    } else {
        print!("{}", report::experiment_index(dataset, ids)?);
    }

    let chart = state.chart_view()?;
    println!();
    print!("{}", report::chart_table(&chart));

    if let Some(path) = &cli.csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        export::write_experiments_csv(BufWriter::new(file), dataset, ids)?;
        log::info!("Wrote {} experiments to {}", ids.len(), path.display());
    }
    if let Some(path) = &cli.chart_csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        export::write_chart_csv(BufWriter::new(file), &chart)?;
        log::info!("Wrote chart series to {}", path.display());
    }
    Ok(())
}
