//! Turns model scores into ratings, confidences and verdicts.

use serde::Serialize;
use tracing::info;

use crate::{
    candidates::{Candidate, Interpretation},
    error::DisambiguationError,
    model::{MaskScorer, PairClassifier},
    query::{build_marker_query, build_pair_query, ensure_single_mask},
};

/// Answer of the single-marker masked-language route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskPrediction {
    pub rating: Candidate,
    pub interpretation: Interpretation,
    pub confidence: f32,
    pub sentence: String,
}

/// Answer of the classifier route. `rating` is the winning class index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierPrediction {
    pub rating: usize,
    pub interpretation: Interpretation,
    pub confidence: f32,
    pub sentence: String,
}

/// Predicts the word for the one `_die_`/`_dat_` marker in `sentence`.
///
/// # Errors
///
/// `MissingMarker` without a marker, `MultipleMasks` when the query would hold
/// more than one mask (checked before the model runs), and any model failure.
pub fn predict_marked(
    scorer: &dyn MaskScorer,
    sentence: &str,
) -> Result<MaskPrediction, DisambiguationError> {
    let query = build_marker_query(sentence, scorer.mask_token())?;
    let (rating, confidence) = scorer.score(&query.query)?.best();

    let prediction = MaskPrediction {
        rating,
        interpretation: Interpretation::from_match(rating == query.marked),
        confidence,
        sentence: sentence.to_string(),
    };
    info!(?prediction, "masked-language prediction");
    Ok(prediction)
}

/// Scores a query that already contains one mask placeholder.
pub(crate) fn score_mask_query(
    scorer: &dyn MaskScorer,
    masked: &str,
) -> Result<(Candidate, f32), DisambiguationError> {
    ensure_single_mask(masked, scorer.mask_token())?;
    Ok(scorer.score(masked)?.best())
}

/// Asks the classifier whether the marked word or its swap fits better.
pub fn classify(
    classifier: &dyn PairClassifier,
    sentence: &str,
) -> Result<ClassifierPrediction, DisambiguationError> {
    let pair = build_pair_query(sentence)?;
    let logits = classifier.classify(&pair.joined())?;

    let rating = usize::from(logits[1] > logits[0]);
    let prediction = ClassifierPrediction {
        rating,
        interpretation: Interpretation::from_match(rating != 1),
        confidence: logits[rating],
        sentence: sentence.to_string(),
    };
    info!(?prediction, "classifier prediction");
    Ok(prediction)
}
