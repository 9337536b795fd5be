//! Accepted character set
//!
//! The alphabet fixes the dimensions of the transition matrix: every accepted
//! character owns one row and one column, in the order it appears in the
//! alphabet string. Anything outside the set is invisible to the model.

use thiserror::Error;

/// Lowercase ASCII letters plus space.
pub const DEFAULT_ACCEPTED_CHARS: &str = "abcdefghijklmnopqrstuvwxyz ";

const ASCII_LEN: usize = 128;
const NOT_ACCEPTED: u16 = u16::MAX;

/// Errors raised while building an alphabet
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlphabetError {
    #[error("accepted character set is empty")]
    Empty,

    #[error("character {ch:?} appears twice in the accepted set (positions {first} and {second})")]
    Duplicate { ch: char, first: usize, second: usize },

    #[error("accepted character set has {0} characters, at most 65535 are supported")]
    TooLarge(usize),
}

/// Ordered set of accepted characters with a dense index per character.
///
/// ASCII lookups go through a flat table; anything else is found by binary
/// search over a sorted copy of the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
    ascii: [u16; ASCII_LEN],
    /// Non-ASCII members sorted by character: (char, index)
    extended: Vec<(char, usize)>,
}

impl Alphabet {
    pub fn new(accepted: &str) -> Result<Self, AlphabetError> {
        let chars: Vec<char> = accepted.chars().collect();
        if chars.is_empty() {
            return Err(AlphabetError::Empty);
        }
        if chars.len() >= NOT_ACCEPTED as usize {
            return Err(AlphabetError::TooLarge(chars.len()));
        }

        let mut ascii = [NOT_ACCEPTED; ASCII_LEN];
        let mut extended: Vec<(char, usize)> = Vec::new();

        for (idx, &ch) in chars.iter().enumerate() {
            if let Some(first) = chars[..idx].iter().position(|&c| c == ch) {
                return Err(AlphabetError::Duplicate {
                    ch,
                    first,
                    second: idx,
                });
            }

            if ch.is_ascii() {
                ascii[ch as usize] = idx as u16;
            } else {
                extended.push((ch, idx));
            }

            if !folds_to_itself(ch) {
                tracing::warn!(
                    "Accepted character {:?} is not lowercase; input is lowercased before lookup so it can never match",
                    ch
                );
            }
        }

        extended.sort_unstable_by_key(|&(ch, _)| ch);

        Ok(Self {
            chars,
            ascii,
            extended,
        })
    }

    /// Number of accepted characters (the matrix dimension `k`)
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The accepted characters in index order
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Character at `idx`
    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    /// Dense index of `ch`, or `None` if it is not accepted.
    ///
    /// This is an exact lookup; case folding happens in [`Alphabet::fold`].
    pub fn index_of(&self, ch: char) -> Option<usize> {
        if ch.is_ascii() {
            let idx = self.ascii[ch as usize];
            return (idx != NOT_ACCEPTED).then_some(idx as usize);
        }
        self.extended
            .binary_search_by_key(&ch, |&(c, _)| c)
            .ok()
            .map(|pos| self.extended[pos].1)
    }

    /// Lowercase `ch` and return the folded character with its index, if the
    /// folded form is a single accepted character.
    pub fn fold(&self, ch: char) -> Option<(char, usize)> {
        let mut lower = ch.to_lowercase();
        let folded = lower.next()?;
        if lower.next().is_some() {
            return None;
        }
        self.index_of(folded).map(|idx| (folded, idx))
    }

    /// Dense indices of the accepted characters of `text`, in order.
    pub fn indices<'a>(&'a self, text: &'a str) -> impl Iterator<Item = usize> + 'a {
        text.chars().filter_map(move |ch| self.fold(ch).map(|(_, idx)| idx))
    }

    /// The alphabet as the string it was built from
    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        // The default set is a compile-time constant with no duplicates.
        Self::new(DEFAULT_ACCEPTED_CHARS).unwrap_or_else(|e| unreachable!("{e}"))
    }
}

impl std::str::FromStr for Alphabet {
    type Err = AlphabetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

fn folds_to_itself(ch: char) -> bool {
    let mut lower = ch.to_lowercase();
    lower.next() == Some(ch) && lower.next().is_none()
}
