use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use spacecal_pipeline::{run_calibration, CalibrationConfig, CalibrationInput, CalibrationReport};

/// Calibrate one tracking space against another from recorded pose pairs.
#[derive(Debug, Parser)]
#[command(author, version, about = "Tracker space calibration")]
struct Args {
    /// Path to JSON file with `reference` and `target` pose lists.
    #[arg(long)]
    input: String,

    /// Optional path to JSON CalibrationConfig. Defaults are used if omitted.
    #[arg(long)]
    config: Option<String>,

    /// Pretty-print the report.
    #[arg(long)]
    pretty: bool,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(value)
}

fn calibrate_from_files(input_path: &str, config_path: Option<&str>) -> Result<CalibrationReport> {
    let input: CalibrationInput = load_json_file(Path::new(input_path))?;

    let config = if let Some(cfg_path) = config_path {
        load_json_file::<CalibrationConfig>(Path::new(cfg_path))?
    } else {
        CalibrationConfig::default()
    };

    info!(
        "loaded {} reference and {} target poses",
        input.reference.len(),
        input.target.len()
    );
    let report = run_calibration(&input, &config)?;
    info!("calibration took {:.1} ms", report.elapsed_ms);
    Ok(report)
}

fn main() {
    env_logger::init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let report = calibrate_from_files(&args.input, args.config.as_deref())?;
    println!("{}", report.to_json(args.pretty)?);
    Ok(())
}
