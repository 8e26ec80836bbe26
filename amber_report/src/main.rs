use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::analysis::completeness_buckets::{
    get_number_of_genomes_per_completeness, table_to_dataframe, BucketThresholds,
};
use crate::analysis::f1_score::{f1_scores_per_method, scores_to_dataframe, summary_to_dataframe};
use crate::analysis::parameter_grid::{build_grid, DEFAULT_COLUMNS, DEFAULT_ROWS};
use crate::analysis::tool_comparison::run_figure;
use crate::data_handling::amber_genome::AmberGenomeResults;
use crate::figures::FigureCatalog;
use crate::helper_functions::{dataframe_to_tsv, write_json};
use crate::models::{BucketTable, DEFAULT_MIN_PURITY};

mod analysis;
mod data_handling;
mod figures;
mod helper_functions;
mod models;

/// Summarise AMBER per-bin metrics of several binners into figure tables.
#[derive(Debug, Parser)]
#[command(name = "amber_report", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Count high-purity bins per completeness bucket for every method.
    Buckets {
        #[command(flatten)]
        args: BucketArgs,
    },
    /// Produce the tables behind one figure preset.
    Figure {
        #[command(flatten)]
        args: BucketArgs,
        #[arg(long)]
        preset: String,
        /// JSON list of extra or overriding figure definitions.
        #[arg(long)]
        figures: Option<PathBuf>,
    },
    /// Per-bin F1 distributions (completeness and purity >= 0.5).
    F1 {
        #[command(flatten)]
        io: IoArgs,
        /// Restrict to these methods, in this order.
        #[arg(long, value_delimiter = ',')]
        methods: Option<Vec<String>>,
    },
    /// >90% bin counts of a `<column>_<row>` parameter sweep.
    Grid {
        #[command(flatten)]
        args: BucketArgs,
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_COLUMNS.map(String::from))]
        columns: Vec<String>,
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_ROWS.map(String::from))]
        rows: Vec<String>,
    },
    /// List the available figure presets.
    Presets {
        #[arg(long)]
        figures: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct IoArgs {
    /// AMBER output directory (the one containing `genome/`).
    #[arg(long, env = "AMBER_PATH")]
    amber: PathBuf,
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

impl IoArgs {
    fn results(&self) -> AmberGenomeResults {
        AmberGenomeResults::new(&self.amber)
    }
}

/// Inputs of the commands built on the bucket table.
#[derive(Debug, Args)]
struct BucketArgs {
    #[command(flatten)]
    io: IoArgs,
    /// Purity cut-off for bucketing, a fraction in [0, 1].
    #[arg(long, default_value_t = DEFAULT_MIN_PURITY, value_parser = parse_min_purity)]
    min_purity: f64,
}

fn parse_min_purity(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("`{raw}` is not a number: {e}"))?;
    BucketThresholds::new(value)
        .map(|t| t.min_purity)
        .map_err(|e| e.to_string())
}

impl BucketArgs {
    fn bucket_table(&self) -> anyhow::Result<BucketTable> {
        let amber = &self.io.amber;
        let thresholds = BucketThresholds::new(self.min_purity)?;
        let table = get_number_of_genomes_per_completeness(&self.io.results(), &thresholds)
            .with_context(|| format!("bucketing AMBER results in {}", amber.display()))?;
        if table.is_empty() {
            warn!("No method result sets under {}", amber.display());
        }
        Ok(table)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli.command)
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Buckets { args } => {
            let table = args.bucket_table()?;
            let mut df = table_to_dataframe(&table)?;
            println!("{}", df);
            dataframe_to_tsv(&mut df, &args.io.out.join("completeness_buckets.tsv"))?;
        }
        Command::Figure {
            args,
            preset,
            figures,
        } => {
            let catalog = load_catalog(figures.as_deref())?;
            let figure = catalog.get(&preset)?;
            let table = args.bucket_table()?;
            let report = run_figure(&table, figure)
                .with_context(|| format!("building figure `{}`", figure.name))?;

            for (idx, panel) in report.panels.iter().enumerate() {
                let mut df = panel.to_dataframe()?;
                if let Some(title) = &panel.title {
                    println!("{}", title);
                }
                println!("{}", df);
                let path = args.io.out.join(format!("{}_panel{}.tsv", report.name, idx));
                dataframe_to_tsv(&mut df, &path)?;
            }
            for comparison in &report.comparisons {
                match comparison.improvement {
                    Some(ratio) => println!("{}: {:.2}%", comparison.description, ratio * 100.0),
                    None => println!("{}: n/a", comparison.description),
                }
            }
            write_json(&report, &args.io.out.join(format!("{}.json", report.name)))?;
        }
        Command::F1 { io, methods } => {
            let scores = f1_scores_per_method(&io.results(), methods.as_deref())
                .with_context(|| format!("computing F1 scores in {}", io.amber.display()))?;
            let mut summary = summary_to_dataframe(&scores)?;
            println!("{}", summary);
            dataframe_to_tsv(&mut scores_to_dataframe(&scores)?, &io.out.join("f1_scores.tsv"))?;
            dataframe_to_tsv(&mut summary, &io.out.join("f1_summary.tsv"))?;
        }
        Command::Grid { args, columns, rows } => {
            let table = args.bucket_table()?;
            let grid = build_grid(&table, &columns, &rows)?;
            let mut df = grid.to_dataframe()?;
            println!("{}", df);
            dataframe_to_tsv(&mut df, &args.io.out.join("parameter_grid.tsv"))?;
        }
        Command::Presets { figures } => {
            let catalog = load_catalog(figures.as_deref())?;
            for name in catalog.names() {
                println!("{}", name);
            }
        }
    }
    info!("Done");
    Ok(())
}

fn load_catalog(extra: Option<&Path>) -> anyhow::Result<FigureCatalog> {
    let mut catalog = FigureCatalog::builtin();
    if let Some(path) = extra {
        catalog
            .load_json(path)
            .with_context(|| format!("loading figure definitions from {}", path.display()))?;
    }
    Ok(catalog)
}
