//! CLI entry point for the demand forecast demo.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use demand_app::commands::{export_report, get_summary, load_file, predict};
use demand_app::events::LogEmitter;
use demand_app::state::Session;
use demand_learning::{ForecastConfig, ForecastResult};
use demand_processing::{DateOrder, ProcessingConfig, WeekdayLanguage};
use dotenv::dotenv;
use serde_json::json;
use tracing::info;

/// CLI-compatible date order enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliDateOrder {
    /// 03/04/2024 is the 3rd of April
    DayFirst,
    /// 03/04/2024 is the 4th of March
    MonthFirst,
}

impl From<CliDateOrder> for DateOrder {
    fn from(cli: CliDateOrder) -> Self {
        match cli {
            CliDateOrder::DayFirst => DateOrder::DayFirst,
            CliDateOrder::MonthFirst => DateOrder::MonthFirst,
        }
    }
}

/// CLI-compatible weekday language enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliWeekdayLanguage {
    Spanish,
    English,
}

impl From<CliWeekdayLanguage> for WeekdayLanguage {
    fn from(cli: CliWeekdayLanguage) -> Self {
        match cli {
            CliWeekdayLanguage::Spanish => WeekdayLanguage::Spanish,
            CliWeekdayLanguage::English => WeekdayLanguage::English,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Daily demand forecasting with a random forest",
    long_about = "Loads a CSV or Excel sales table, cleans it, derives calendar columns \
                  and forecasts daily demand.\n\n\
                  EXAMPLES:\n  \
                  # Summary of the processed table\n  \
                  demand-app -i ventas.csv\n\n  \
                  # Forecast 30 days of one article and write the report\n  \
                  demand-app -i ventas.xlsx --article Pan --horizon 30 -o prediccion_demanda.xlsx\n\n  \
                  # Machine-readable output\n  \
                  demand-app -i ventas.csv --horizon 14 --json | jq .forecast"
)]
struct Args {
    /// Path to the CSV/XLSX/XLS file to load
    #[arg(short, long)]
    input: PathBuf,

    /// Article to forecast ("All" for every row)
    #[arg(short, long, default_value = "All")]
    article: String,

    /// Days to forecast (7-365)
    ///
    /// If neither this nor --output is given, only the summary is shown
    #[arg(long)]
    horizon: Option<usize>,

    /// Path of the xlsx report to write
    ///
    /// Implies a forecast; the horizon defaults to 30 days
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Resolution of ambiguous dd/mm dates
    #[arg(long, value_enum, default_value = "day-first")]
    date_order: CliDateOrder,

    /// Language of the weekday-name column
    #[arg(long, value_enum, default_value = "spanish")]
    weekday_language: CliWeekdayLanguage,

    /// Number of trees in the forest
    #[arg(long, default_value = "100")]
    trees: usize,

    /// Seed for the bootstrap samples
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON document.
    #[arg(long)]
    json: bool,
}

const DEFAULT_HORIZON: usize = 30;

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

fn build_session(args: &Args) -> Result<Session> {
    let processing_config = ProcessingConfig::builder()
        .date_order(args.date_order.into())
        .weekday_language(args.weekday_language.into())
        .build()?;
    let forecast_config = ForecastConfig::builder()
        .n_estimators(args.trees)
        .random_seed(args.seed)
        .build()?;
    Ok(Session::new(processing_config, forecast_config))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);
    dotenv().ok();

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let mut session = build_session(&args)?;
    let emitter = LogEmitter;

    load_file(&mut session, &emitter, &args.input)?;
    let summary = get_summary(&session)?;

    let horizon = match (args.horizon, &args.output) {
        (Some(h), _) => Some(h),
        (None, Some(_)) => Some(DEFAULT_HORIZON),
        (None, None) => None,
    };
    let forecast = match horizon {
        Some(h) => Some(predict(&mut session, &emitter, &args.article, h)?),
        None => None,
    };

    if let Some(path) = &args.output {
        let report = export_report(&session, &emitter)?;
        std::fs::write(path, &report.bytes)?;
        info!("Report written to {} ({} bytes)", path.display(), report.size_bytes);
    }

    if args.json {
        let document = json!({
            "summary": summary,
            "forecast": forecast,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print_summary(&args.input, &summary);
        if let Some(forecast) = &forecast {
            print_forecast(forecast);
        }
    }

    Ok(())
}

/// Human-readable overview of the processed table.
///
/// Uses `println!` on purpose: this is the program's output, not a log.
fn print_summary(input: &Path, summary: &demand_app::commands::SummaryResponse) {
    println!("\n{}", "=".repeat(60));
    println!("DATASET OVERVIEW");
    println!("{}", "=".repeat(60));
    println!("  File: {}", input.display());
    println!("  Rows: {}", summary.summary.rows);
    println!("  Columns: {}", summary.summary.columns);
    println!(
        "  Article column: {}",
        summary.article_column.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Demand column: {}",
        summary.target_column.as_deref().unwrap_or("(none)")
    );
    println!("  Articles: {}", summary.roster.join(", "));

    if !summary.processing_steps.is_empty() {
        println!("\nPROCESSING STEPS");
        println!("{}", "-".repeat(40));
        for step in &summary.processing_steps {
            println!("  - {}", step);
        }
    }

    if let Some(demand) = &summary.statistics.demand {
        println!("\nDEMAND");
        println!("{}", "-".repeat(40));
        println!(
            "  mean {:.2}  median {:.2}  min {:.2}  max {:.2}",
            demand.mean, demand.median, demand.min, demand.max
        );
    }
}

fn print_forecast(forecast: &ForecastResult) {
    println!("\nFORECAST ({}, {} days, {})", forecast.filter, forecast.horizon, forecast.model);
    println!("{}", "-".repeat(40));
    println!("{:<12} {:>10}", "Date", "Demand");
    for point in &forecast.forecast {
        println!("{:<12} {:>10.2}", point.date.format("%Y-%m-%d"), point.value);
    }

    if !forecast.feature_importance.is_empty() {
        println!("\nFEATURE IMPORTANCE");
        for (name, score) in &forecast.feature_importance {
            println!("  {:<16} {:.3}", name, score);
        }
    }
    println!();
}
