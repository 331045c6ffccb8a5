use anyhow::Result;
use clap::{Parser, Subcommand};
use f1tracker::{aggregate, clean, export, ingest, month::Month, report};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Monthly constructor points tracker over historical Formula 1 results.
#[derive(Parser)]
#[command(name = "f1tracker", version, about)]
struct Cli {
    /// Directory holding races.csv, constructors.csv and constructor_results*.csv
    #[arg(long, global = true, default_value = "data/raw")]
    raw: PathBuf,

    /// Output directory for charts and exports
    #[arg(long, global = true, default_value = "reports")]
    out: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the top-N chart for one month
    Report {
        /// Month to chart, as YYYY-MM (e.g. 2012-08)
        #[arg(long)]
        month: Month,
        /// How many constructors to show
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Render a chart for every month in the data, plus an index page
    RenderAll {
        /// How many constructors to show per chart
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Export the monthly aggregate and trend table (parquet, csv, summary)
    Export,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cli = Cli::parse();

    // The whole pipeline is transient: load, clean and aggregate on every run.
    let raw = ingest::load_race_results(&cli.raw)?;
    let (records, summary) = clean::clean(raw);
    let table = aggregate::monthly_table(&records);
    info!(rows = table.len(), "built monthly table");

    match cli.command {
        Command::Report { month, top } => {
            let rows = report::top_for_month(&table, month, top)?;
            let out = report::render_month_chart(&rows, month, top, &cli.out.join("charts"))?;
            println!("Saved -> {}", out.display());
        }
        Command::RenderAll { top } => {
            let charts = report::render_all(&table, top, &cli.out)?;
            println!(
                "Rendered {} charts into {}",
                charts.len(),
                cli.out.join("charts").display()
            );
            println!("Open: {}", cli.out.join("index.html").display());
        }
        Command::Export => {
            fs::create_dir_all(&cli.out)?;
            export::write_parquet(&table, &cli.out.join("constructor_monthly.parquet"))?;
            export::write_csv(&table, &cli.out.join("constructor_monthly.csv"))?;
            export::write_summary(&table, &summary, &cli.out.join("summary.json"))?;
            println!("Saved -> {}", cli.out.display());
        }
    }

    Ok(())
}
