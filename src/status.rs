// Status display: dataset presence, last sweep, final model and reports.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::data::dataset::dataset_files;
use crate::output::archive::load_results_header;

/// Display pipeline status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    // Dataset files
    let files = dataset_files(&config.data_dir, &config.dataset);
    let present = files.iter().filter(|p| p.exists()).count();
    if present == files.len() {
        let size: u64 = files
            .iter()
            .filter_map(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .sum();
        println!(
            "Dataset: {} in {} ({})",
            config.dataset,
            config.data_dir.display(),
            format_bytes(size)
        );
    } else {
        println!(
            "Dataset: {} not found in {} ({present}/{} files)",
            config.dataset,
            config.data_dir.display(),
            files.len()
        );
        if let Err(e) = config.require_dataset() {
            if let Some(hint) = e.to_string().lines().nth(1) {
                println!("  {}", hint.trim());
            }
        }
        return Ok(());
    }

    // Results archive
    let results_path = config.results_path();
    if results_path.exists() {
        let archive = load_results_header(&results_path)?;
        let with_models = archive.results.iter().filter(|r| r.has_model()).count();
        let ks: Vec<String> = archive
            .results
            .iter()
            .map(|r| r.params.n_topics.to_string())
            .collect();
        println!(
            "Evaluation: {} models on '{}' ({} with fitted models, created {})",
            archive.results.len(),
            archive.dataset,
            with_models,
            archive.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        println!("  k = {}", ks.join(", "));
    } else {
        println!("Evaluation: not run yet");
        println!("  Run `ldasweep evaluate` to evaluate topic models");
    }

    print_artifact("Plot", &config.plot_path());
    print_artifact("Final model", &config.final_model_path());

    let summary_dir = config.summary_dir();
    if summary_dir.is_dir() {
        let sheets = std::fs::read_dir(&summary_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|x| x == "csv"))
            .count();
        println!("Summary: {} ({sheets} sheets)", summary_dir.display());
    } else {
        println!("Summary: not written yet");
        println!("  Run `ldasweep finalize` to select a model and summarize it");
    }

    Ok(())
}

fn print_artifact(name: &str, path: &Path) {
    match std::fs::metadata(path) {
        Ok(m) => println!("{name}: {} ({})", path.display(), format_bytes(m.len())),
        Err(_) => println!("{name}: not written yet"),
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
