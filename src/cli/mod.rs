//! CLI command definitions and handlers

mod check;
mod train;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gibdetect::config::GibConfig;
use gibdetect::model::MAX_PRIOR;
use std::path::PathBuf;

/// Parse and validate the smoothing prior (1 to MAX_PRIOR)
fn parse_prior(s: &str) -> Result<u64, String> {
    let n: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("prior must be at least 1".to_string())
    } else if n > MAX_PRIOR {
        Err(format!("prior must be at most {}", MAX_PRIOR))
    } else {
        Ok(n)
    }
}

/// gibdetect - flag text that does not look like natural language
#[derive(Parser, Debug)]
#[command(name = "gibdetect")]
#[command(
    version,
    about = "Character bigram gibberish detector",
    long_about = "gibdetect learns how often each character follows another in ordinary \
text, then flags strings whose character transitions are unlikely under that model.\n\n\
A model trained on English ships with the binary; train your own with `gibdetect train`.",
    after_help = "\
Examples:
  gibdetect check \"hello world\" \"ytjkacvzw\"      Classify arguments
  gibdetect check --file inputs.txt --format json   Classify each line of a file
  gibdetect score \"is this thing working?\"         Print the raw score
  gibdetect train big.txt good.txt bad.txt model.json"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file (default: ./gibdetect.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a model from a text corpus and labeled examples
    #[command(after_help = "\
Examples:
  gibdetect train big.txt good.txt bad.txt model.json
  gibdetect train big.txt good.txt bad.txt model.json --accepted-chars \"abcdefghijklmnopqrstuvwxyz\"")]
    Train {
        /// Big file with normal text, read line by line
        texts: PathBuf,

        /// File with good examples, one per line
        good_inputs: PathBuf,

        /// File with gibberish examples, one per line
        bad_inputs: PathBuf,

        /// File to save the model to
        output: PathBuf,

        /// Characters the model recognizes (default: a-z and space)
        #[arg(long)]
        accepted_chars: Option<String>,

        /// Pseudo-count added to every character transition
        #[arg(long, value_parser = parse_prior)]
        prior: Option<u64>,
    },

    /// Print the average transition probability of each input
    Score {
        /// Texts to score (default: read lines from stdin)
        texts: Vec<String>,

        /// Model file (default: configured model, else the bundled one)
        #[arg(long, short = 'm')]
        model: Option<PathBuf>,
    },

    /// Classify each input as gibberish or not
    Check {
        /// Texts to classify
        texts: Vec<String>,

        /// Also classify each line of this file ("-" for stdin)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Model file (default: configured model, else the bundled one)
        #[arg(long, short = 'm')]
        model: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Exit with code 1 if any input is gibberish
        #[arg(long)]
        fail_on_gibberish: bool,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let config = GibConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Train {
            texts,
            good_inputs,
            bad_inputs,
            output,
            accepted_chars,
            prior,
        } => {
            let mut train_config = config.train_config();
            if let Some(chars) = accepted_chars {
                train_config.accepted_chars = chars;
            }
            if let Some(prior) = prior {
                train_config.prior = prior;
            }
            train::run(&texts, &good_inputs, &bad_inputs, &output, &train_config)
        }

        Commands::Score { texts, model } => {
            let model = check::resolve_model(model.as_deref(), &config)?;
            check::run_score(&model, texts)
        }

        Commands::Check {
            texts,
            file,
            model,
            format,
            fail_on_gibberish,
        } => {
            let model = check::resolve_model(model.as_deref(), &config)?;
            let any_gibberish = check::run_check(&model, texts, file.as_deref(), &format)?;
            if fail_on_gibberish && any_gibberish {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
