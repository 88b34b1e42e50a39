// Daily soil water balance command line tool.
//
// Reads a daily rainfall column from CSV, runs the bucket model for the chosen
// soil and writes `soil_water_balance_<soil>.csv` plus a summary on stdout.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use soil_water_balance::daily_inputs::DEFAULT_RAIN_COLUMN;
use soil_water_balance::outputs::{output_file_name, write_records};
use soil_water_balance::{BalanceConfig, BalanceError, RainfallSeries, SoilType, WaterBalance};

#[derive(Parser)]
#[command(name = "soil_water_balance")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daily single-bucket soil water balance", long_about = None)]
struct Cli {
    /** Soil profile: deep or shallow (prompted for when omitted) */
    #[arg(short, long)]
    soil: Option<String>,

    /** CSV file with a daily rainfall column */
    #[arg(short, long, default_value = "daily_rainfall_jalgaon_chalisgaon_talegaon_2022.csv")]
    input: PathBuf,

    /** Name of the rainfall column [mm/day] */
    #[arg(short, long, default_value = DEFAULT_RAIN_COLUMN)]
    column: String,

    /** Directory the result table is written to */
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /** TOML file overriding soil, runoff and crop parameters */
    #[arg(long)]
    config: Option<PathBuf>,

    /** Log level (trace, debug, info, warn, error) */
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {e}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_code(&e)
        }
    }
}

// A bad soil tag or an absent rainfall file ends the run without output but is
// not a process failure, everything else is
fn exit_code(e: &anyhow::Error) -> ExitCode {
    match e.downcast_ref::<BalanceError>() {
        Some(BalanceError::InvalidSoilType(_) | BalanceError::InputNotFound { .. }) => {
            ExitCode::SUCCESS
        }
        _ => ExitCode::FAILURE,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let soil_tag = match cli.soil {
        Some(tag) => tag,
        None => prompt_soil_type()?,
    };
    // Reject the soil type before touching any input
    let soil: SoilType = soil_tag.parse()?;

    let config = match &cli.config {
        Some(path) => BalanceConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BalanceConfig::default(),
    };

    let rainfall = RainfallSeries::from_csv_path(&cli.input, &cli.column)?;
    info!(soil = %soil, days = rainfall.len(), "running water balance");

    let output = WaterBalance::from_config(&config, soil).run(rainfall.as_slice())?;

    let output_file = cli.output_dir.join(output_file_name(soil));
    write_records(&output_file, &output.records)
        .with_context(|| format!("writing {}", output_file.display()))?;

    println!("\nWater balance results saved to: {}", output_file.display());
    println!("\nSummary Statistics:");
    print!("{}", output.summary);
    Ok(())
}

fn prompt_soil_type() -> anyhow::Result<String> {
    print!("Enter soil type ('deep' or 'shallow'): ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading soil type from stdin")?;
    Ok(line)
}
