use std::{collections::HashMap, path::PathBuf, sync::Mutex};

use ndarray::{Array2, ArrayViewD};
use ort::{
    session::{
        Session,
        builder::{GraphOptimizationLevel, SessionBuilder},
    },
    value::Value,
};
use tokenizers::{
    PaddingDirection, PaddingParams, PaddingStrategy, Tokenizer, TruncationDirection,
    TruncationParams, TruncationStrategy,
};
use tracing::{debug, info};

use crate::{
    candidates::{Candidate, CandidateScores},
    error::ModelError,
};

const DEFAULT_PAD_TOKEN: &str = "<pad>";

/// Scores the four candidates at the single mask position of a query.
pub trait MaskScorer: Send + Sync {
    /// Placeholder the model recognises as the masked slot.
    fn mask_token(&self) -> &str;

    fn score(&self, query: &str) -> Result<CandidateScores, ModelError>;
}

/// Binary sequence classifier over a `own <sep> swapped` pair query.
/// Index 0 means the written token is right, index 1 that the swap is preferred.
pub trait PairClassifier: Send + Sync {
    fn classify(&self, query: &str) -> Result<[f32; 2], ModelError>;
}

/// On-disk artifacts for one model.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
}

/// Masked-language model over an ONNX session.
pub struct MaskedLmModel {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    mask_token: String,
    mask_id: u32,
    candidate_ids: [u32; 4],
}

impl MaskedLmModel {
    pub fn new(
        paths: &ModelPaths,
        mask_token: &str,
        intra_threads: usize,
    ) -> Result<Self, ModelError> {
        let tokenizer = load_tokenizer(paths)?;
        let mask_id = vocab_id(&tokenizer, mask_token)?;

        let mut candidate_ids = [0u32; 4];
        for (slot, candidate) in candidate_ids.iter_mut().zip(Candidate::ALL) {
            *slot = vocab_id(&tokenizer, candidate.as_str())?;
        }

        let session = build_session(paths, intra_threads)?;
        info!(model = %paths.model.display(), ?candidate_ids, "loaded masked-language model");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            mask_token: mask_token.to_string(),
            mask_id,
            candidate_ids,
        })
    }
}

impl MaskScorer for MaskedLmModel {
    fn mask_token(&self) -> &str {
        &self.mask_token
    }

    fn score(&self, query: &str) -> Result<CandidateScores, ModelError> {
        let encoding = self
            .tokenizer
            .encode(query, true)
            .map_err(ModelError::Encode)?;
        let position = single_mask_position(encoding.get_ids(), self.mask_id)?;

        let input_ids = encoding.get_ids().iter().map(|&x| i64::from(x)).collect();
        let attention_mask = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| i64::from(x))
            .collect();

        let candidate_ids = self.candidate_ids;
        let scores = run_logits(&self.session, input_ids, attention_mask, |logits| {
            candidate_scores(logits, position, candidate_ids)
        })?;
        debug!(query, ?scores, "scored mask position");
        Ok(scores)
    }
}

/// Finetuned sequence classifier over an ONNX session.
pub struct ClassifierModel {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl ClassifierModel {
    /// Inputs are truncated from the left and padded on the right to exactly
    /// `max_sequence_length` tokens.
    pub fn new(
        paths: &ModelPaths,
        max_sequence_length: usize,
        intra_threads: usize,
    ) -> Result<Self, ModelError> {
        let mut tokenizer = load_tokenizer(paths)?;
        fixed_length(&mut tokenizer, max_sequence_length)?;

        let session = build_session(paths, intra_threads)?;
        info!(model = %paths.model.display(), max_sequence_length, "loaded sequence classifier");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }
}

impl PairClassifier for ClassifierModel {
    fn classify(&self, query: &str) -> Result<[f32; 2], ModelError> {
        let encoding = self
            .tokenizer
            .encode(query, true)
            .map_err(ModelError::Encode)?;

        let input_ids = encoding.get_ids().iter().map(|&x| i64::from(x)).collect();
        let attention_mask = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| i64::from(x))
            .collect();

        run_logits(&self.session, input_ids, attention_mask, pair_logits)
    }
}

/// Truncates from the left and pads on the right to exactly `max_sequence_length`
/// tokens. The pad token comes from the tokenizer's own padding config, else `<pad>`.
fn fixed_length(tokenizer: &mut Tokenizer, max_sequence_length: usize) -> Result<(), ModelError> {
    if max_sequence_length == 0 {
        return Err(ModelError::ZeroSequenceLength);
    }

    let pad_token = tokenizer
        .get_padding()
        .map(|p| p.pad_token.clone())
        .unwrap_or_else(|| DEFAULT_PAD_TOKEN.to_string());
    let pad_id = vocab_id(tokenizer, &pad_token)?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_sequence_length,
            strategy: TruncationStrategy::LongestFirst,
            stride: 0,
            direction: TruncationDirection::Left,
        }))
        .map_err(ModelError::ConfigureTruncation)?;

    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::Fixed(max_sequence_length),
        direction: PaddingDirection::Right,
        pad_to_multiple_of: None,
        pad_id,
        pad_type_id: 0,
        pad_token,
    }));
    Ok(())
}

/// Reads the four candidate logits at `position` from `[1, sequence, vocabulary]`.
fn candidate_scores(
    logits: ArrayViewD<'_, f32>,
    position: usize,
    candidate_ids: [u32; 4],
) -> Result<CandidateScores, ModelError> {
    const EXPECTED: &str = "[1, sequence, vocabulary]";
    let shape = logits.shape();
    if shape.len() != 3 || shape[0] != 1 || position >= shape[1] {
        return Err(unexpected(shape, EXPECTED));
    }
    let mut scores = [0f32; 4];
    for (slot, id) in scores.iter_mut().zip(candidate_ids) {
        let index: &[usize] = &[0, position, id as usize];
        *slot = *logits.get(index).ok_or_else(|| unexpected(shape, EXPECTED))?;
    }
    Ok(CandidateScores(scores))
}

/// Reads `[1, 2]` classifier logits.
fn pair_logits(logits: ArrayViewD<'_, f32>) -> Result<[f32; 2], ModelError> {
    if logits.shape() != [1, 2] {
        return Err(unexpected(logits.shape(), "[1, 2]"));
    }
    match logits.iter().copied().collect::<Vec<_>>().as_slice() {
        &[correct, incorrect] => Ok([correct, incorrect]),
        _ => Err(unexpected(logits.shape(), "[1, 2]")),
    }
}

fn load_tokenizer(paths: &ModelPaths) -> Result<Tokenizer, ModelError> {
    Tokenizer::from_file(&paths.tokenizer).map_err(|source| ModelError::LoadTokenizer {
        path: paths.tokenizer.clone(),
        source,
    })
}

fn build_session(paths: &ModelPaths, intra_threads: usize) -> Result<Session, ModelError> {
    SessionBuilder::new()
        .map_err(ModelError::CreateSessionBuilder)?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| ModelError::CreateSessionBuilder(e.into()))?
        .with_intra_threads(intra_threads)
        .map_err(|e| ModelError::CreateSessionBuilder(e.into()))?
        .commit_from_file(&paths.model)
        .map_err(|source| ModelError::CreateSession {
            path: paths.model.clone(),
            source,
        })
}

fn vocab_id(tokenizer: &Tokenizer, token: &str) -> Result<u32, ModelError> {
    tokenizer
        .token_to_id(token)
        .ok_or_else(|| ModelError::UnknownToken {
            token: token.to_string(),
        })
}

/// Position of the one mask id in `ids`.
fn single_mask_position(ids: &[u32], mask_id: u32) -> Result<usize, ModelError> {
    let positions: Vec<usize> = ids
        .iter()
        .enumerate()
        .filter(|(_, id)| **id == mask_id)
        .map(|(i, _)| i)
        .collect();
    match positions.as_slice() {
        [] => Err(ModelError::NoMaskPosition),
        [position] => Ok(*position),
        more => Err(ModelError::MultipleMasks { count: more.len() }),
    }
}

/// Runs the session on `[1, seq]` inputs and hands the first output to `read`.
fn run_logits<T>(
    session: &Mutex<Session>,
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    read: impl FnOnce(ArrayViewD<'_, f32>) -> Result<T, ModelError>,
) -> Result<T, ModelError> {
    let seq_len = input_ids.len();

    let input_ids_tensor = Value::from_array(Array2::from_shape_vec((1, seq_len), input_ids)?)
        .map_err(ModelError::EncodeTensor)?;
    let attention_mask_tensor =
        Value::from_array(Array2::from_shape_vec((1, seq_len), attention_mask)?)
            .map_err(ModelError::EncodeTensor)?;

    let mut inputs = HashMap::new();
    inputs.insert("input_ids".to_string(), input_ids_tensor);
    inputs.insert("attention_mask".to_string(), attention_mask_tensor);

    let mut session = session.lock().map_err(|_| ModelError::SessionPoisoned)?;
    let outputs = session.run(inputs).map_err(ModelError::Inference)?;
    let logits = outputs[0]
        .try_extract_array::<f32>()
        .map_err(ModelError::Inference)?;
    read(logits)
}

fn unexpected(shape: &[usize], expected: &str) -> ModelError {
    ModelError::UnexpectedOutput {
        shape: shape.to_vec(),
        expected: expected.to_string(),
    }
}

#[cfg(test)]
mod tests {

    use ndarray::{Array2, Array3};
    use tokenizers::{
        Tokenizer, models::wordlevel::WordLevel, pre_tokenizers::whitespace::Whitespace,
        processors::roberta::RobertaProcessing,
    };

    use super::{candidate_scores, fixed_length, pair_logits, single_mask_position};
    use crate::error::ModelError;

    const MASK: u32 = 4;

    /// RoBERTa-shaped word-level tokenizer: `<s>`=0, `<pad>`=1, `</s>`=2, `<unk>`=3, a..f=4..9.
    fn roberta_like() -> Tokenizer {
        let tokens = ["<s>", "<pad>", "</s>", "<unk>", "a", "b", "c", "d", "e", "f"];
        let vocab = tokens
            .into_iter()
            .zip(0u32..)
            .map(|(token, id)| (token.to_string(), id))
            .collect();
        let model = WordLevel::builder()
            .vocab(vocab)
            .unk_token("<unk>".to_string())
            .build()
            .expect("word-level model builds");
        let mut tokenizer = Tokenizer::new(model);
        tokenizer.with_pre_tokenizer(Some(Whitespace {}));
        tokenizer.with_post_processor(Some(RobertaProcessing::new(
            ("</s>".to_string(), 2),
            ("<s>".to_string(), 0),
        )));
        tokenizer
    }

    /// Logit at `[0, p, v]` is `p * 100 + v`.
    fn positional_logits(sequence: usize, vocabulary: usize) -> Array3<f32> {
        Array3::from_shape_fn((1, sequence, vocabulary), |(_, p, v)| (p * 100 + v) as f32)
    }

    #[test]
    fn finds_the_single_mask() {
        assert_eq!(single_mask_position(&[0, 12, MASK, 9, 2], MASK).ok(), Some(2));
    }

    #[test]
    fn rejects_two_masks() {
        assert!(matches!(
            single_mask_position(&[0, MASK, 7, MASK, 2], MASK),
            Err(ModelError::MultipleMasks { count: 2 })
        ));
    }

    #[test]
    fn rejects_missing_mask() {
        assert!(matches!(
            single_mask_position(&[0, 7, 2], MASK),
            Err(ModelError::NoMaskPosition)
        ));
    }

    #[test]
    fn reads_candidate_ids_at_mask_position_in_order() {
        let logits = positional_logits(3, 10);
        let scores = candidate_scores(logits.view().into_dyn(), 1, [7, 3, 9, 0])
            .expect("shape is valid");
        assert_eq!(scores.0, [107.0, 103.0, 109.0, 100.0]);
    }

    #[test]
    fn rejects_position_past_sequence() {
        let logits = positional_logits(3, 10);
        assert!(matches!(
            candidate_scores(logits.view().into_dyn(), 3, [0, 1, 2, 3]),
            Err(ModelError::UnexpectedOutput { .. })
        ));
    }

    #[test]
    fn rejects_candidate_outside_vocabulary() {
        let logits = positional_logits(3, 10);
        assert!(matches!(
            candidate_scores(logits.view().into_dyn(), 0, [0, 1, 2, 10]),
            Err(ModelError::UnexpectedOutput { .. })
        ));
    }

    #[test]
    fn rejects_non_sequence_logits() {
        let logits = Array2::<f32>::zeros((1, 10));
        match candidate_scores(logits.view().into_dyn(), 0, [0, 1, 2, 3]) {
            Err(ModelError::UnexpectedOutput { shape, .. }) => assert_eq!(shape, [1, 10]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reads_pair_logits() {
        let logits = Array2::from_shape_vec((1, 2), vec![2.5_f32, -1.0]).expect("shape");
        assert_eq!(
            pair_logits(logits.view().into_dyn()).expect("valid"),
            [2.5, -1.0]
        );
    }

    #[test]
    fn rejects_wrong_pair_shape() {
        let logits = Array2::<f32>::zeros((1, 3));
        assert!(matches!(
            pair_logits(logits.view().into_dyn()),
            Err(ModelError::UnexpectedOutput { .. })
        ));
        let logits = Array2::<f32>::zeros((2, 1));
        assert!(matches!(
            pair_logits(logits.view().into_dyn()),
            Err(ModelError::UnexpectedOutput { .. })
        ));
    }

    #[test]
    fn long_input_keeps_the_tail() {
        let mut tokenizer = roberta_like();
        fixed_length(&mut tokenizer, 6).expect("configures");
        let encoding = tokenizer.encode("a b c d e f", true).expect("encodes");
        assert_eq!(encoding.get_ids(), [0, 6, 7, 8, 9, 2]);
        assert_eq!(encoding.get_attention_mask(), [1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn short_input_is_padded_with_masked_attention() {
        let mut tokenizer = roberta_like();
        fixed_length(&mut tokenizer, 6).expect("configures");
        let encoding = tokenizer.encode("a b", true).expect("encodes");
        assert_eq!(encoding.get_ids(), [0, 4, 5, 2, 1, 1]);
        assert_eq!(encoding.get_attention_mask(), [1, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn zero_length_is_rejected() {
        let mut tokenizer = roberta_like();
        assert!(matches!(
            fixed_length(&mut tokenizer, 0),
            Err(ModelError::ZeroSequenceLength)
        ));
    }
}
