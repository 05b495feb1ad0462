//! CLI entry point for the EDA pipelines.

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use lex_eda::config::RetailConfigBuilder;
use lex_eda::reporting::{ReportEnvelope, ReportGenerator, console, write_csv};
use lex_eda::{ListingsCleaner, RetailConfig, RetailPipeline, load_csv};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Exploratory data analysis for listings and retail datasets",
    long_about = "Runs one of two fixed exploratory analyses over a CSV file.\n\n\
                  EXAMPLES:\n  \
                  # Audit and fill missing values in a listings file\n  \
                  lex-eda listings -i AB_NYC_2019.csv -o output/listings_clean.csv\n\n  \
                  # Full retail analysis with charts in output/charts\n  \
                  lex-eda retail -i retail_sales_dataset.csv -o output\n\n  \
                  # Machine-readable report only\n  \
                  lex-eda retail -i retail_sales_dataset.csv --no-charts --json"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the result)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit missing values in a listings file and fill them with defaults
    Listings {
        /// Path to the listings CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Write the cleaned table to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output the JSON report to stdout instead of the text summary
        #[arg(long)]
        json: bool,
    },

    /// Analyze a retail transactions file
    Retail {
        /// Path to the retail transactions CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for charts and reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// JSON configuration file (see RetailConfig)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip chart rendering
        #[arg(long)]
        no_charts: bool,

        /// Number of product categories in the ranked lists
        #[arg(long)]
        top_n: Option<usize>,

        /// Number of bins in the transaction amount histogram
        #[arg(long)]
        histogram_bins: Option<usize>,

        /// Count an age equal to the last bracket edge (e.g. 100) in the last bracket
        #[arg(long)]
        inclusive_age_upper: bool,

        /// Output the JSON report to stdout instead of the text summary
        ///
        /// Disables all progress logs; only the final JSON report is printed.
        #[arg(long)]
        json: bool,

        /// Write the JSON report to the output directory as <input_name>_report.json
        #[arg(short = 'r', long)]
        emit_report: bool,
    },
}

impl Command {
    fn json(&self) -> bool {
        match self {
            Command::Listings { json, .. } | Command::Retail { json, .. } => *json,
        }
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.quiet, cli.command.json());

    // Load environment variables from .env file
    dotenv().ok();

    match &cli.command {
        Command::Listings {
            input,
            output,
            json,
        } => run_listings(input, output.as_deref(), *json),
        Command::Retail { .. } => run_retail(&cli.command),
    }
}

fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string())
}

fn run_listings(input: &Path, output: Option<&Path>, json: bool) -> Result<()> {
    let data = load_csv(input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    if !json {
        console::print_head(&data, 5);
    }

    let (mut cleaned, report) = ListingsCleaner::default().clean(data)?;

    if let Some(path) = output {
        write_csv(&mut cleaned, path)?;
    }

    if json {
        let envelope = ReportEnvelope::new("listings", input, output, &report);
        println!("{}", envelope.to_json()?);
    } else {
        console::print_listings_report(&report);
        if let Some(path) = output {
            println!("Cleaned dataset: {}", path.display());
        }
    }

    Ok(())
}

fn retail_config(command: &Command) -> Result<RetailConfig> {
    let Command::Retail {
        output,
        config,
        no_charts,
        top_n,
        histogram_bins,
        inclusive_age_upper,
        ..
    } = command
    else {
        anyhow::bail!("not a retail command");
    };

    let base = match config {
        Some(path) => RetailConfig::from_json_file(path)?,
        None => RetailConfig::default(),
    };
    let render_charts = base.render_charts && !*no_charts;
    let inclusive = base.age_bins.inclusive_upper || *inclusive_age_upper;

    let mut builder = RetailConfigBuilder::from_config(base)
        .chart_dir(output.join("charts"))
        .render_charts(render_charts)
        .inclusive_age_upper(inclusive);
    if let Some(n) = top_n {
        builder = builder.top_n(*n);
    }
    if let Some(bins) = histogram_bins {
        builder = builder.histogram_bins(*bins);
    }

    Ok(builder.build()?)
}

fn run_retail(command: &Command) -> Result<()> {
    let Command::Retail {
        input,
        output,
        json,
        emit_report,
        ..
    } = command
    else {
        anyhow::bail!("not a retail command");
    };

    let config = retail_config(command)?;
    let data = load_csv(input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let (_, report) = RetailPipeline::builder()
        .config(config)
        .build()?
        .run(data)?;

    let envelope = ReportEnvelope::new("retail", input, None, &report);

    if *json {
        println!("{}", envelope.to_json()?);
    } else {
        console::print_retail_report(&report);
    }

    if *emit_report {
        let path =
            ReportGenerator::new(output).write_report_to_file(&envelope, &input_stem(input))?;
        if !*json {
            println!("Report: {}", path.display());
        }
    }

    Ok(())
}
