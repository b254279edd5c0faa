// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::io::{self, Write};
use std::path::PathBuf;

use stock_status_lib::form::{build_record, render_prediction, FormPrompter};
use stock_status_lib::inference::PredictionContext;
use stock_status_lib::utils::artifact_config::ArtifactConfig;
use stock_status_lib::utils::env::load_env;
use stock_status_lib::utils::init_logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Predict whether stock will be overstocked or run out", long_about = None)]
struct Cli {
    /// Directory holding the model, label map and feature name artifacts
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,

    /// Model file (relative paths resolve against the artifacts directory)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Label map file
    #[arg(long)]
    label_map: Option<PathBuf>,

    /// Feature names file
    #[arg(long)]
    feature_names: Option<PathBuf>,

    /// Pre-fill a form field, e.g. `--set season=peak`
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    set: Vec<String>,

    /// Repeat the submitted input above the result
    #[arg(long)]
    echo: bool,

    /// Print the full prediction as JSON
    #[arg(long)]
    json: bool,

    /// Do not prompt for fields missing from --set
    #[arg(long)]
    non_interactive: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    info!("Starting stock status prediction");
    load_env();

    let config = ArtifactConfig::from_env().with_overrides(
        cli.artifacts_dir.clone(),
        cli.model.clone(),
        cli.label_map.clone(),
        cli.feature_names.clone(),
    );
    config.log_config();

    // Nothing is asked of the user until every artifact has loaded.
    let context = match PredictionContext::load(&config) {
        Ok(context) => context,
        Err(e) => {
            error!("Model files could not be loaded: {:#}", e);
            return Err(e.context(format!(
                "Model files not found or invalid. Make sure '{}', '{}' and '{}' are present and readable.",
                config.model_path().display(),
                config.label_map_path().display(),
                config.feature_names_path().display()
            )));
        }
    };

    let mut record =
        build_record(context.layout(), &cli.set).context("Invalid --set value")?;

    if !cli.non_interactive {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "Stock Risk Prediction")?;
        writeln!(
            out,
            "Enter stock details, and we'll predict whether stock is overstocked or stockout.\n"
        )?;
        let stdin = io::stdin();
        let mut prompter = FormPrompter::new(stdin.lock(), out);
        prompter.collect(context.layout(), &mut record)?;
    }

    let prediction = context.predict(&record)?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&prediction).context("Failed to serialize prediction")?
        );
    } else {
        print!("\n{}", render_prediction(&prediction, cli.echo));
    }
    Ok(())
}
