//! Character bigram transition model
//!
//! Training text is reduced to a fixed alphabet, every pair of consecutive
//! characters is counted, and the counts become per-row log-probabilities
//! ("how likely is `b` right after `a`"). A string is scored by the average
//! log-probability of its transitions, and a threshold calibrated on labeled
//! examples turns that score into a gibberish verdict.
//!
//! Pipeline: [`Alphabet`] → [`normalize`] → [`TransitionCounts`] →
//! [`TransitionModel`] → [`calibrate`] → [`Model`].

pub mod alphabet;
pub mod calibrate;
pub mod counts;
pub mod normalize;
pub mod persist;
pub mod score;
pub mod train;

pub use alphabet::{Alphabet, AlphabetError, DEFAULT_ACCEPTED_CHARS};
pub use calibrate::{calibrate_threshold, Calibration};
pub use counts::{TransitionCounts, DEFAULT_PRIOR, MAX_PRIOR};
pub use normalize::{bigrams, normalize, normalize_indices};
pub use persist::{ModelError, ModelFile};
pub use train::{train, TrainConfig, TrainError, TrainReport, Trainer};

use serde::Serialize;

/// k×k matrix of natural-log transition probabilities, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct LogProbMatrix {
    dim: usize,
    cells: Vec<f64>,
}

impl LogProbMatrix {
    /// `cells.len()` must be `dim * dim`.
    pub(crate) fn from_cells(dim: usize, cells: Vec<f64>) -> Self {
        debug_assert_eq!(cells.len(), dim * dim);
        Self { dim, cells }
    }

    /// Matrix dimension `k`
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Log-probability of `to` following `from`
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.cells[from * self.dim + to]
    }

    pub fn row(&self, from: usize) -> &[f64] {
        &self.cells[from * self.dim..(from + 1) * self.dim]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.cells.chunks(self.dim)
    }
}

/// Alphabet plus transition log-probabilities, before a threshold is chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionModel {
    alphabet: Alphabet,
    log_probs: LogProbMatrix,
}

impl TransitionModel {
    /// The matrix dimension must match the alphabet size.
    pub(crate) fn new(alphabet: Alphabet, log_probs: LogProbMatrix) -> Self {
        debug_assert_eq!(alphabet.len(), log_probs.dim());
        Self { alphabet, log_probs }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn log_probs(&self) -> &LogProbMatrix {
        &self.log_probs
    }

    /// See [`score::avg_transition_prob`]
    pub fn avg_transition_prob(&self, text: &str) -> f64 {
        score::avg_transition_prob(text, self)
    }

    /// Attach a decision threshold.
    pub fn with_threshold(self, threshold: f64) -> Model {
        Model {
            transitions: self,
            threshold,
        }
    }
}

/// A trained gibberish model: transition probabilities and the score below
/// which a string counts as gibberish. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    transitions: TransitionModel,
    threshold: f64,
}

/// Score and decision for one input
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    pub score: f64,
    pub threshold: f64,
    pub gibberish: bool,
}

impl Model {
    pub fn alphabet(&self) -> &Alphabet {
        self.transitions.alphabet()
    }

    pub fn log_probs(&self) -> &LogProbMatrix {
        self.transitions.log_probs()
    }

    pub fn transitions(&self) -> &TransitionModel {
        &self.transitions
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Geometric-mean transition probability of `text` under this model.
    pub fn avg_transition_prob(&self, text: &str) -> f64 {
        self.transitions.avg_transition_prob(text)
    }

    /// True if `text` scores strictly below the threshold.
    pub fn is_gibberish(&self, text: &str) -> bool {
        self.avg_transition_prob(text) < self.threshold
    }

    pub fn classify(&self, text: &str) -> Verdict {
        let score = self.avg_transition_prob(text);
        Verdict {
            score,
            threshold: self.threshold,
            gibberish: score < self.threshold,
        }
    }
}
