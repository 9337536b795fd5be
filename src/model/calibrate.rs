//! Decision threshold calibration
//!
//! Scores labeled good and bad examples against a candidate model and places
//! the threshold halfway between the worst good score and the best bad one.

use super::train::{ExampleKind, TrainError};
use super::TransitionModel;
use std::cmp::Ordering;

/// Scores of the labeled examples and the threshold derived from them
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub good_scores: Vec<f64>,
    pub bad_scores: Vec<f64>,
    /// Lowest score among good examples
    pub worst_good: f64,
    /// Highest score among bad examples
    pub best_bad: f64,
    pub threshold: f64,
}

impl Calibration {
    /// Distance between the two classes; always positive for a valid
    /// calibration.
    pub fn margin(&self) -> f64 {
        self.worst_good - self.best_bad
    }
}

/// Pick the midpoint threshold separating `good` from `bad`.
///
/// Fails if either set is empty, or if the sets overlap (the worst good
/// example does not score strictly above the best bad one).
pub fn calibrate_threshold<G, B>(
    model: &TransitionModel,
    good: G,
    bad: B,
) -> Result<Calibration, TrainError>
where
    G: IntoIterator,
    G::Item: AsRef<str>,
    B: IntoIterator,
    B::Item: AsRef<str>,
{
    let good_scores = score_all(model, good);
    let bad_scores = score_all(model, bad);

    let worst_good = min_score(&good_scores).ok_or(TrainError::NoExamples {
        kind: ExampleKind::Good,
    })?;
    let best_bad = max_score(&bad_scores).ok_or(TrainError::NoExamples {
        kind: ExampleKind::Bad,
    })?;

    // `partial_cmp` is None for NaN, which is rejected too.
    if worst_good.partial_cmp(&best_bad) != Some(Ordering::Greater) {
        return Err(TrainError::Inseparable {
            worst_good,
            best_bad,
        });
    }

    Ok(Calibration {
        good_scores,
        bad_scores,
        worst_good,
        best_bad,
        threshold: (worst_good + best_bad) / 2.0,
    })
}

fn score_all<I>(model: &TransitionModel, inputs: I) -> Vec<f64>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    inputs
        .into_iter()
        .map(|text| model.avg_transition_prob(text.as_ref()))
        .collect()
}

fn min_score(scores: &[f64]) -> Option<f64> {
    scores.iter().copied().reduce(f64::min)
}

fn max_score(scores: &[f64]) -> Option<f64> {
    scores.iter().copied().reduce(f64::max)
}
