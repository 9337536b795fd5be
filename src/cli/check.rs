//! Score and check commands - run a model over input text

use anyhow::{Context, Result};
use console::style;
use gibdetect::config::GibConfig;
use gibdetect::{default_model, Model, Verdict};
use rayon::prelude::*;
use serde::Serialize;
use std::borrow::Cow;
use std::io::BufRead;
use std::path::Path;

/// Pick the model: `--model`, then the configured path, then the default.
pub fn resolve_model(flag: Option<&Path>, config: &GibConfig) -> Result<Cow<'static, Model>> {
    match flag.or_else(|| config.model_path()) {
        Some(path) => {
            let model = Model::load(path)
                .with_context(|| format!("Failed to load model {}", path.display()))?;
            Ok(Cow::Owned(model))
        }
        None => Ok(Cow::Borrowed(default_model()?)),
    }
}

/// Run the score command
pub fn run_score(model: &Model, texts: Vec<String>) -> Result<()> {
    let inputs = if texts.is_empty() {
        read_lines(std::io::stdin().lock())?
    } else {
        texts
    };

    for score in score_all(model, &inputs) {
        println!("{}", score);
    }
    Ok(())
}

/// Run the check command. Returns whether any input was gibberish.
pub fn run_check(model: &Model, texts: Vec<String>, file: Option<&Path>, format: &str) -> Result<bool> {
    let mut inputs = texts;
    match file {
        Some(path) if path == Path::new("-") => {
            inputs.extend(read_lines(std::io::stdin().lock())?);
        }
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            inputs.extend(content.lines().map(str::to_string));
        }
        None if inputs.is_empty() => {
            inputs.extend(read_lines(std::io::stdin().lock())?);
        }
        None => {}
    }

    let results = classify_all(model, &inputs);
    let any_gibberish = results.iter().any(|r| r.verdict.gibberish);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&results)?),
        _ => {
            for result in &results {
                let label = if result.verdict.gibberish {
                    style("gibberish").red().bold()
                } else {
                    style("ok").green()
                };
                println!("{:<9} {:.6}  {}", label, result.verdict.score, result.text);
            }
        }
    }

    Ok(any_gibberish)
}

/// One classified input
#[derive(Debug, Serialize)]
pub struct CheckResult<'a> {
    pub text: &'a str,
    #[serde(flatten)]
    pub verdict: Verdict,
}

/// Classify inputs in parallel, keeping input order.
fn classify_all<'a>(model: &Model, inputs: &'a [String]) -> Vec<CheckResult<'a>> {
    inputs
        .par_iter()
        .map(|text| CheckResult {
            text,
            verdict: model.classify(text),
        })
        .collect()
}

fn score_all(model: &Model, inputs: &[String]) -> Vec<f64> {
    inputs
        .par_iter()
        .map(|text| model.avg_transition_prob(text))
        .collect()
}

fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .context("Failed to read input lines")
}
