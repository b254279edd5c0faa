// src/bin/report_model_weights.rs
use anyhow::{bail, Result};
use clap::Parser;
use ndarray::ArrayView1;
use std::path::PathBuf;

use stock_status_lib::features::FeatureSchema;
use stock_status_lib::inference::load_artifacts;
use stock_status_lib::model::{Classifier, LabelMap};
use stock_status_lib::utils::artifact_config::ArtifactConfig;
use stock_status_lib::utils::env::load_env;
use stock_status_lib::utils::init_logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Print the stock status model's weights by feature", long_about = None)]
struct ReportArgs {
    /// Directory holding the model, label map and feature name artifacts
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,

    /// Number of features to list per class
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn print_class_report(
    title: &str,
    weights: ArrayView1<'_, f64>,
    bias: f64,
    schema: &FeatureSchema,
    top: usize,
) {
    println!("==================================================");
    println!("  {}", title);
    println!("==================================================");

    let mut weighted_features: Vec<(&str, f64)> = schema
        .columns()
        .iter()
        .map(String::as_str)
        .zip(weights.iter().copied())
        .collect();

    // Sort by the absolute value of the weight to find the most influential features
    weighted_features.sort_by(|a, b| {
        b.1.abs()
            .partial_cmp(&a.1.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    println!("      Most Influential Features (Sorted by Absolute Weight):");
    println!("      ------------------------------------------------------");
    println!("      | {:<35} | {:>10} |", "Feature Name", "Weight");
    println!("      |-------------------------------------|------------|");
    for (name, weight) in weighted_features.iter().take(top) {
        println!("      | {:<35} | {:>10.4} |", name, weight);
    }
    println!("      |-------------------------------------|------------|");
    println!("      | {:<35} | {:>10.4} |", "(Bias Term)", bias);
    println!("      ------------------------------------------------------\n");
}

fn class_title(label_map: &LabelMap, code: i64) -> String {
    match label_map.decode(code) {
        Ok(label) => format!("Class: {} (code {})", label.to_uppercase(), code),
        Err(_) => format!("Class: <unlabeled> (code {})", code),
    }
}

fn main() -> Result<()> {
    let args = ReportArgs::parse();
    init_logging(args.verbose);
    load_env();

    let config = ArtifactConfig::from_env().with_overrides(args.artifacts_dir, None, None, None);
    config.log_config();
    let artifacts = load_artifacts(&config)?;

    let model = &artifacts.model;
    if model.n_features() != artifacts.schema.len() {
        bail!(
            "Model has {} weights per class but the feature schema has {} columns",
            model.n_features(),
            artifacts.schema.len()
        );
    }

    println!("--- Stock Status Model Weight Report ---\n");

    let coefficients = model.coefficients();
    let intercepts = model.intercepts();
    if model.is_binary() {
        // A binary model stores one row, scored toward the second class.
        let title = format!(
            "{} vs {}",
            class_title(&artifacts.label_map, model.classes()[1]),
            class_title(&artifacts.label_map, model.classes()[0])
        );
        print_class_report(&title, coefficients.row(0), intercepts[0], &artifacts.schema, args.top);
    } else {
        for (row, code) in model.classes().iter().enumerate() {
            print_class_report(
                &class_title(&artifacts.label_map, *code),
                coefficients.row(row),
                intercepts[row],
                &artifacts.schema,
                args.top,
            );
        }
    }

    println!("--- End of Report ---");
    Ok(())
}
