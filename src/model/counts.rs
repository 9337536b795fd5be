//! Bigram transition counting

use super::alphabet::Alphabet;
use super::normalize::Normalizer;
use super::LogProbMatrix;

/// Pseudo-count every transition starts with.
///
/// Acts as additive smoothing: a transition never seen in the corpus still
/// gets a small nonzero probability instead of zeroing a whole string.
pub const DEFAULT_PRIOR: u64 = 10;

/// Largest accepted prior. Leaves room in every `u64` cell for the corpus
/// counts on top of it.
pub const MAX_PRIOR: u64 = u32::MAX as u64;

/// k×k bigram counts, row-major: `counts[i * k + j]` is how often
/// `alphabet[j]` followed `alphabet[i]`, plus the prior.
#[derive(Debug, Clone)]
pub struct TransitionCounts {
    alphabet: Alphabet,
    counts: Vec<u64>,
    lines: usize,
    observed: u64,
    normalizer: Normalizer,
}

impl TransitionCounts {
    /// Every cell starts at `prior`. Callers must pass `1 <= prior <=
    /// MAX_PRIOR` for the row sums to stay positive and the cells to stay in
    /// range.
    pub fn new(alphabet: Alphabet, prior: u64) -> Self {
        let k = alphabet.len();
        Self {
            alphabet,
            counts: vec![prior; k * k],
            lines: 0,
            observed: 0,
            normalizer: Normalizer::new(),
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Count every bigram of one line of reference text.
    pub fn observe(&mut self, line: &str) {
        let k = self.alphabet.len();
        for (a, b) in self.normalizer.bigrams(line, &self.alphabet) {
            let cell = &mut self.counts[a * k + b];
            *cell = cell.saturating_add(1);
            self.observed = self.observed.saturating_add(1);
        }
        self.lines += 1;
    }

    /// Cell `(from, to)`
    pub fn get(&self, from: usize, to: usize) -> u64 {
        self.counts[from * self.alphabet.len() + to]
    }

    /// Summed in `u128`; a row of large cells does not fit in `u64`.
    pub fn row_sum(&self, row: usize) -> u128 {
        let k = self.alphabet.len();
        self.counts[row * k..(row + 1) * k]
            .iter()
            .map(|&c| u128::from(c))
            .sum()
    }

    /// Lines fed so far
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Bigrams counted so far (excluding the prior)
    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// Normalize each row into log-probabilities: `ln(count / row_sum)`.
    ///
    /// Consumes the counts so they cannot change after normalization.
    pub fn into_log_probs(self) -> (Alphabet, LogProbMatrix) {
        let k = self.alphabet.len();
        let mut cells = Vec::with_capacity(k * k);
        for row in self.counts.chunks(k) {
            let sum = row.iter().map(|&c| u128::from(c)).sum::<u128>() as f64;
            cells.extend(row.iter().map(|&c| (c as f64 / sum).ln()));
        }
        (self.alphabet, LogProbMatrix::from_cells(k, cells))
    }
}
