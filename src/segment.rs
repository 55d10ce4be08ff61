//! Splits a sentence around every bare die/dat and predicts each one.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    candidates::{Candidate, Interpretation},
    disambiguate::score_mask_query,
    error::DisambiguationError,
    model::MaskScorer,
    query::build_mask_query,
};

static BARE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:die|dat|Die|Dat)\b").expect("word pattern is valid"));

/// Prediction for one bare occurrence inside a longer sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordPrediction {
    pub predicted: Candidate,
    pub input: String,
    pub interpretation: Interpretation,
    pub confidence: f32,
    pub sentence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Segment {
    Part { part: String },
    Prediction(WordPrediction),
}

/// Walks `sentence` left to right, emitting literal parts and one prediction
/// per match. The trailing part is always emitted, so a sentence without any
/// match comes back as a single part.
pub fn segment(
    scorer: &dyn MaskScorer,
    sentence: &str,
) -> Result<Vec<Segment>, DisambiguationError> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for m in BARE_WORD.find_iter(sentence) {
        debug!(word = m.as_str(), start = m.start(), end = m.end(), "match");
        if m.start() > cursor {
            segments.push(Segment::Part {
                part: sentence[cursor..m.start()].to_string(),
            });
        }

        let masked = build_mask_query(sentence, m.range(), scorer.mask_token());
        let (predicted, confidence) = score_mask_query(scorer, &masked)?;
        let input = m.as_str();
        let written = Candidate::from_word(input);
        segments.push(Segment::Prediction(WordPrediction {
            predicted,
            input: input.to_string(),
            interpretation: Interpretation::from_match(written == Some(predicted)),
            confidence,
            sentence: sentence.to_string(),
        }));
        cursor = m.end();
    }

    segments.push(Segment::Part {
        part: sentence[cursor..].to_string(),
    });
    info!(sentence, segments = segments.len(), "segmented sentence");
    Ok(segments)
}
