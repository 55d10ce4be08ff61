//! Builds model queries from user sentences.

use std::{ops::Range, sync::LazyLock};

use regex::Regex;

use crate::{
    candidates::{Candidate, Marker},
    error::QueryError,
    words::Words,
};

/// Literal placed between the two alternatives fed to the classifier.
pub const PAIR_SEPARATOR: &str = " <sep> ";

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)_(?:die|dat)_").expect("marker pattern is valid"));

/// The original sentence and its swapped alternative, for the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairQuery {
    pub own: String,
    pub swapped: String,
}

impl PairQuery {
    pub fn joined(&self) -> String {
        format!("{}{PAIR_SEPARATOR}{}", self.own, self.swapped)
    }
}

/// A sentence whose single marker has been replaced by the mask placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerQuery {
    pub query: String,
    pub marked: Candidate,
}

/// Resolves the first marker word into its own and swapped forms.
pub fn build_pair_query(sentence: &str) -> Result<PairQuery, QueryError> {
    let words = Words::tokenize(sentence);
    let (index, marker) = words
        .words()
        .iter()
        .enumerate()
        .find_map(|(i, w)| Marker::parse(w).map(|m| (i, m)))
        .ok_or(QueryError::MissingMarker)?;

    Ok(PairQuery {
        own: words.with_word(index, marker.own.as_str()).detokenize(),
        swapped: words.with_word(index, marker.swapped().as_str()).detokenize(),
    })
}

/// Replaces the one marker in `sentence` with `mask_token`.
pub fn build_marker_query(sentence: &str, mask_token: &str) -> Result<MarkerQuery, QueryError> {
    let markers: Vec<_> = MARKER.find_iter(sentence).collect();
    let marked = match markers.as_slice() {
        [] => return Err(QueryError::MissingMarker),
        [only] => only,
        more => return Err(QueryError::MultipleMasks { count: more.len() }),
    };
    let candidate = Marker::parse(marked.as_str())
        .ok_or(QueryError::MissingMarker)?
        .own;
    let query = build_mask_query(sentence, marked.range(), mask_token);
    ensure_single_mask(&query, mask_token)?;
    Ok(MarkerQuery {
        query,
        marked: candidate,
    })
}

/// Substitutes `span` with the mask placeholder, keeping all other text verbatim.
pub fn build_mask_query(sentence: &str, span: Range<usize>, mask_token: &str) -> String {
    let mut query = String::with_capacity(sentence.len() + mask_token.len());
    query.push_str(&sentence[..span.start]);
    query.push_str(mask_token);
    query.push_str(&sentence[span.end..]);
    query
}

/// Rejects queries that contain the placeholder more than once.
pub fn ensure_single_mask(query: &str, mask_token: &str) -> Result<(), QueryError> {
    let count = query.matches(mask_token).count();
    if count > 1 {
        return Err(QueryError::MultipleMasks { count });
    }
    Ok(())
}
