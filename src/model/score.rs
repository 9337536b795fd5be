//! Average transition probability

use super::normalize::bigrams;
use super::TransitionModel;

/// Starting value of the log-probability accumulator.
///
/// Seeded at 1.0 rather than 0.0, which lifts every score by a factor of
/// `exp(1 / transitions)`. Trained thresholds and the shipped model depend
/// on it, so it stays.
pub const LOG_PROB_SEED: f64 = 1.0;

/// Average log transition probability of `text`, mapped back to probability
/// space.
///
/// Text is normalized to the model's alphabet first. With no transitions at
/// all (fewer than two accepted characters) the divisor is 1, so the score is
/// exactly `exp(LOG_PROB_SEED)`.
pub fn avg_transition_prob(text: &str, model: &TransitionModel) -> f64 {
    let indices: Vec<usize> = model.alphabet().indices(text).collect();
    let log_probs = model.log_probs();

    let mut log_prob = LOG_PROB_SEED;
    let mut transitions = 0usize;
    for (a, b) in bigrams(&indices) {
        log_prob += log_probs.get(a, b);
        transitions += 1;
    }

    (log_prob / transitions.max(1) as f64).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alphabet, TransitionCounts};

    fn english_like() -> TransitionModel {
        let mut counts = TransitionCounts::new(Alphabet::default(), 10);
        for line in [
            "the cat sat on the mat and looked at the hat",
            "there is nothing more pleasant than a quiet evening at home",
            "she sells sea shells by the sea shore",
        ] {
            counts.observe(line);
        }
        let (alphabet, matrix) = counts.into_log_probs();
        TransitionModel::new(alphabet, matrix)
    }

    #[test]
    fn test_no_accepted_chars_scores_e() {
        let model = english_like();
        for text in ["", "1234", "!?!?", "a", "9a9"] {
            assert_eq!(avg_transition_prob(text, &model), 1.0f64.exp());
        }
    }

    #[test]
    fn test_score_is_idempotent() {
        let model = english_like();
        let first = avg_transition_prob("the sea at home", &model);
        let second = avg_transition_prob("the sea at home", &model);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_seeded_accumulator() {
        let model = english_like();
        let a = model.alphabet().index_of('t').unwrap();
        let b = model.alphabet().index_of('h').unwrap();
        let expected = (1.0 + model.log_probs().get(a, b)).exp();
        assert_eq!(avg_transition_prob("th", &model), expected);
    }

    #[test]
    fn test_english_scores_above_noise() {
        let model = english_like();
        let good = avg_transition_prob("the hat is at home", &model);
        let bad = avg_transition_prob("qxzvkjwq", &model);
        assert!(good > bad);
        assert!(good > 0.0 && bad > 0.0);
    }

    #[test]
    fn test_case_and_punctuation_do_not_matter() {
        let model = english_like();
        assert_eq!(
            avg_transition_prob("The Cat, sat!", &model),
            avg_transition_prob("the cat sat", &model)
        );
    }
}
