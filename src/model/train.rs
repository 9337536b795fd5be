//! Model training
//!
//! Counts bigrams over a reference corpus, normalizes the counts into
//! log-probabilities, then calibrates the decision threshold on labeled
//! examples.

use super::alphabet::{Alphabet, AlphabetError, DEFAULT_ACCEPTED_CHARS};
use super::calibrate::{calibrate_threshold, Calibration};
use super::counts::{TransitionCounts, DEFAULT_PRIOR, MAX_PRIOR};
use super::{Model, TransitionModel};
use thiserror::Error;

/// Which labeled set an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleKind {
    Good,
    Bad,
}

impl std::fmt::Display for ExampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExampleKind::Good => f.write_str("good"),
            ExampleKind::Bad => f.write_str("bad"),
        }
    }
}

/// Errors that can occur while training
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainError {
    #[error("invalid accepted characters: {0}")]
    Alphabet(#[from] AlphabetError),

    #[error("smoothing prior must be at least 1")]
    ZeroPrior,

    #[error("smoothing prior {prior} is too large (at most {max})")]
    PriorTooLarge { prior: u64, max: u64 },

    #[error("no {kind} examples given; need at least one to calibrate the threshold")]
    NoExamples { kind: ExampleKind },

    #[error(
        "good and bad examples overlap: worst good score {worst_good:.6} is not above best bad score {best_bad:.6}"
    )]
    Inseparable { worst_good: f64, best_bad: f64 },
}

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Characters the model recognizes, in matrix order
    pub accepted_chars: String,
    /// Pseudo-count added to every transition before normalizing
    pub prior: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            accepted_chars: DEFAULT_ACCEPTED_CHARS.to_string(),
            prior: DEFAULT_PRIOR,
        }
    }
}

/// Summary of a finished training run
#[derive(Debug, Clone)]
pub struct TrainReport {
    /// Corpus lines read
    pub lines: usize,
    /// Bigrams counted from the corpus
    pub bigrams: u64,
    /// Alphabet size
    pub alphabet_len: usize,
    pub calibration: Calibration,
}

/// Streaming trainer: feed corpus lines, then finish with labeled examples.
#[derive(Debug)]
pub struct Trainer {
    counts: TransitionCounts,
}

impl Trainer {
    pub fn new(config: &TrainConfig) -> Result<Self, TrainError> {
        if config.prior == 0 {
            return Err(TrainError::ZeroPrior);
        }
        if config.prior > MAX_PRIOR {
            return Err(TrainError::PriorTooLarge {
                prior: config.prior,
                max: MAX_PRIOR,
            });
        }
        let alphabet = Alphabet::new(&config.accepted_chars)?;
        Ok(Self {
            counts: TransitionCounts::new(alphabet, config.prior),
        })
    }

    /// Count the bigrams of one corpus line.
    pub fn feed_line(&mut self, line: &str) {
        self.counts.observe(line);
    }

    pub fn feed_lines<I>(&mut self, lines: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for line in lines {
            self.feed_line(line.as_ref());
        }
    }

    /// Lines fed so far
    pub fn lines(&self) -> usize {
        self.counts.lines()
    }

    /// Normalize the counts and calibrate the threshold.
    ///
    /// Fails without producing a model if the examples cannot be separated.
    pub fn finish<G, B>(self, good: G, bad: B) -> Result<(Model, TrainReport), TrainError>
    where
        G: IntoIterator,
        G::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        let lines = self.counts.lines();
        let bigrams = self.counts.observed();
        let (alphabet, log_probs) = self.counts.into_log_probs();
        let candidate = TransitionModel::new(alphabet, log_probs);

        let calibration = calibrate_threshold(&candidate, good, bad)?;

        tracing::info!(
            "Trained on {} lines ({} bigrams): worst good {:.6}, best bad {:.6}, threshold {:.6}",
            lines,
            bigrams,
            calibration.worst_good,
            calibration.best_bad,
            calibration.threshold
        );

        let report = TrainReport {
            lines,
            bigrams,
            alphabet_len: candidate.alphabet().len(),
            calibration,
        };
        let model = candidate.with_threshold(report.calibration.threshold);
        Ok((model, report))
    }
}

/// Train a model in one call.
pub fn train<L, G, B>(lines: L, good: G, bad: B, config: &TrainConfig) -> Result<Model, TrainError>
where
    L: IntoIterator,
    L::Item: AsRef<str>,
    G: IntoIterator,
    G::Item: AsRef<str>,
    B: IntoIterator,
    B::Item: AsRef<str>,
{
    let mut trainer = Trainer::new(config)?;
    trainer.feed_lines(lines);
    trainer.finish(good, bad).map(|(model, _)| model)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &[&str] = &[
        "we walked along the river and talked about the weather",
        "the train was late so we waited in the station for an hour",
        "she opened the window and listened to the birds in the garden",
        "it is a quiet town where everyone knows the name of the baker",
    ];

    #[test]
    fn test_train_config_default() {
        let config = TrainConfig::default();
        assert_eq!(config.accepted_chars, DEFAULT_ACCEPTED_CHARS);
        assert_eq!(config.prior, 10);
    }

    #[test]
    fn test_train_separates_examples() {
        let good = ["the weather is nice", "we waited"];
        let bad = ["qzxvkj", "jjqqxx wvz"];
        let model = train(CORPUS, good, bad, &TrainConfig::default()).unwrap();

        for text in good {
            assert!(!model.is_gibberish(text), "{:?} flagged", text);
        }
        for text in bad {
            assert!(model.is_gibberish(text), "{:?} not flagged", text);
        }
    }

    #[test]
    fn test_trainer_report() {
        let mut trainer = Trainer::new(&TrainConfig::default()).unwrap();
        trainer.feed_lines(CORPUS);
        assert_eq!(trainer.lines(), 4);

        let (model, report) = trainer.finish(["the garden"], ["xqzj"]).unwrap();
        assert_eq!(report.lines, 4);
        assert_eq!(report.alphabet_len, 27);
        assert!(report.bigrams > 0);
        assert_eq!(model.threshold(), report.calibration.threshold);
    }

    #[test]
    fn test_zero_prior_rejected() {
        let config = TrainConfig {
            prior: 0,
            ..TrainConfig::default()
        };
        assert!(matches!(Trainer::new(&config), Err(TrainError::ZeroPrior)));
    }

    #[test]
    fn test_oversized_prior_rejected() {
        for prior in [u64::MAX, u64::MAX / 2, MAX_PRIOR + 1] {
            let config = TrainConfig {
                prior,
                ..TrainConfig::default()
            };
            assert_eq!(
                Trainer::new(&config).err(),
                Some(TrainError::PriorTooLarge {
                    prior,
                    max: MAX_PRIOR
                })
            );
            let result = train(CORPUS, ["the weather"], ["qzxvkj"], &config);
            assert!(matches!(result, Err(TrainError::PriorTooLarge { .. })));
        }
    }

    #[test]
    fn test_max_prior_trains_without_overflow() {
        let config = TrainConfig {
            prior: MAX_PRIOR,
            ..TrainConfig::default()
        };
        let mut trainer = Trainer::new(&config).unwrap();
        trainer.feed_lines(CORPUS);
        assert_eq!(trainer.lines(), CORPUS.len());
    }

    #[test]
    fn test_bad_alphabet_rejected() {
        let config = TrainConfig {
            accepted_chars: "aa".to_string(),
            ..TrainConfig::default()
        };
        assert!(matches!(
            Trainer::new(&config),
            Err(TrainError::Alphabet(AlphabetError::Duplicate { .. }))
        ));
    }

    #[test]
    fn test_inseparable_produces_no_model() {
        let result = train(CORPUS, ["xqzj"], ["the weather"], &TrainConfig::default());
        assert!(matches!(result, Err(TrainError::Inseparable { .. })));
    }

    #[test]
    fn test_custom_alphabet() {
        let config = TrainConfig {
            accepted_chars: "abcdefghijklmnopqrstuvwxyz".to_string(),
            prior: 1,
        };
        let model = train(CORPUS, ["the weather"], ["qqqq"], &config).unwrap();
        assert_eq!(model.alphabet().len(), 26);
        assert_eq!(model.log_probs().dim(), 26);
    }
}
