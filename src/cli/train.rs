//! Train command - build a model from a corpus and labeled examples

use anyhow::{Context, Result};
use console::style;
use gibdetect::model::{TrainConfig, Trainer};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

/// Update the spinner every this many corpus lines
const PROGRESS_EVERY: usize = 10_000;

/// Run the train command
pub fn run(
    texts: &Path,
    good_inputs: &Path,
    bad_inputs: &Path,
    output: &Path,
    config: &TrainConfig,
) -> Result<()> {
    // Read the small example files first so a typo fails before the long pass
    let good = read_examples(good_inputs)?;
    let bad = read_examples(bad_inputs)?;

    let mut trainer = Trainer::new(config)?;

    let corpus = File::open(texts)
        .with_context(|| format!("Failed to open corpus {}", texts.display()))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(create_spinner_style());
    spinner.set_message("Counting character transitions...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    for line in BufReader::new(corpus).lines() {
        let line = line.with_context(|| format!("Failed to read {}", texts.display()))?;
        trainer.feed_line(&line);
        if trainer.lines() % PROGRESS_EVERY == 0 {
            spinner.set_message(format!("Counting character transitions... {} lines", trainer.lines()));
        }
    }
    spinner.finish_and_clear();

    let (model, report) = trainer
        .finish(&good, &bad)
        .context("Training failed")?;

    model
        .save(output)
        .with_context(|| format!("Failed to save model to {}", output.display()))?;

    let cal = &report.calibration;
    println!(
        "{} Trained on {} lines ({} transitions, {} characters)",
        style("✓").green(),
        style(report.lines).cyan(),
        style(report.bigrams).cyan(),
        style(report.alphabet_len).cyan(),
    );
    println!(
        "  worst good {:.6}  best bad {:.6}  threshold {}",
        cal.worst_good,
        cal.best_bad,
        style(format!("{:.6}", cal.threshold)).bold()
    );
    println!("  saved to {}", style(output.display()).cyan());
    Ok(())
}

/// Read one example per line, skipping blank lines
fn read_examples(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read examples {}", path.display()))?;
    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}

/// Create spinner progress style
fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
