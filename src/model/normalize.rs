//! Text normalization and bigram extraction

use super::alphabet::Alphabet;

/// Keep only the accepted characters of `text`, lowercased, in their
/// original order. Everything else is dropped, not replaced.
pub fn normalize(text: &str, alphabet: &Alphabet) -> String {
    text.chars()
        .filter_map(|ch| alphabet.fold(ch).map(|(folded, _)| folded))
        .collect()
}

/// Normalize `text` straight to dense alphabet indices.
pub fn normalize_indices(text: &str, alphabet: &Alphabet) -> Vec<usize> {
    alphabet.indices(text).collect()
}

/// All contiguous index pairs of a normalized sequence.
///
/// Yields `len - 1` pairs, or nothing for fewer than two characters. Call it
/// again on the same slice to restart.
pub fn bigrams(indices: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    indices.windows(2).map(|pair| (pair[0], pair[1]))
}

/// Reusable scratch buffer for normalizing many lines without reallocating.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    buf: Vec<usize>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `text` into the internal buffer and return its bigrams.
    pub fn bigrams<'a>(
        &'a mut self,
        text: &str,
        alphabet: &Alphabet,
    ) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.buf.clear();
        self.buf.extend(alphabet.indices(text));
        bigrams(&self.buf)
    }
}
