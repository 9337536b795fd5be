//! gibdetect - character bigram gibberish detection
//!
//! A model of "which character tends to follow which" is trained on ordinary
//! text. Strings whose character transitions are unlikely under that model
//! are reported as gibberish.
//!
//! ```no_run
//! use gibdetect::model::{train, TrainConfig};
//!
//! let corpus = std::fs::read_to_string("data/corpus.txt")?;
//! let model = train(
//!     corpus.lines(),
//!     ["my name is rob and i like to hack", "seems okay"],
//!     ["ytjkacvzw", "yutthasxcvqer"],
//!     &TrainConfig::default(),
//! )?;
//! assert!(model.is_gibberish("ytjkacvzw"));
//!
//! // Or use the bundled English model
//! assert!(!gibdetect::is_gibberish("is this thing working?")?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod default_model;
pub mod model;

pub use default_model::{default_model, DefaultModelError};
pub use model::{Alphabet, Model, TrainConfig, TrainError, Verdict};

/// Classify `text` with the default model.
///
/// The default model is loaded on the first call and reused afterwards. Pass
/// an explicit model with [`Model::is_gibberish`] instead to avoid global
/// state.
pub fn is_gibberish(text: &str) -> Result<bool, DefaultModelError> {
    Ok(default_model()?.is_gibberish(text))
}

/// Score `text` with the default model. See [`Model::avg_transition_prob`].
pub fn avg_transition_prob(text: &str) -> Result<f64, DefaultModelError> {
    Ok(default_model()?.avg_transition_prob(text))
}
