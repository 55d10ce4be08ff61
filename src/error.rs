use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning a sentence into a model query.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("'die' or 'dat' should be surrounded by underscores.")]
    MissingMarker,
    #[error("No two queries allowed in one sentence.")]
    MultipleMasks { count: usize },
}

/// Errors produced while loading or running the ONNX models.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to load tokenizer from {path}: {source}")]
    LoadTokenizer {
        path: PathBuf,
        #[source]
        source: tokenizers::Error,
    },
    #[error("failed to configure tokenizer truncation: {0}")]
    ConfigureTruncation(#[source] tokenizers::Error),
    #[error("failed to construct ONNX session builder: {0}")]
    CreateSessionBuilder(#[source] ort::Error),
    #[error("failed to create ONNX session from {path}: {source}")]
    CreateSession {
        path: PathBuf,
        #[source]
        source: ort::Error,
    },
    #[error("token \"{token}\" is not in the model vocabulary")]
    UnknownToken { token: String },
    #[error("classifier requires max_sequence_length > 0")]
    ZeroSequenceLength,
    #[error("failed to encode text: {0}")]
    Encode(#[source] tokenizers::Error),
    #[error("failed to shape input tensor: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("failed to convert encoded text into tensor: {0}")]
    EncodeTensor(#[source] ort::Error),
    #[error("session mutex was poisoned by a previous panic")]
    SessionPoisoned,
    #[error("failed to run inference: {0}")]
    Inference(#[source] ort::Error),
    #[error("model output has shape {shape:?}, expected {expected}")]
    UnexpectedOutput { shape: Vec<usize>, expected: String },
    #[error("No two queries allowed in one sentence.")]
    MultipleMasks { count: usize },
    #[error("query does not contain a mask position")]
    NoMaskPosition,
}

/// Anything that can go wrong while answering a disambiguation request.
#[derive(Debug, Error)]
pub enum DisambiguationError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl DisambiguationError {
    /// True when the query held more than one mask, at string or token level.
    pub fn is_multiple_masks(&self) -> bool {
        matches!(
            self,
            DisambiguationError::Query(QueryError::MultipleMasks { .. })
                | DisambiguationError::Model(ModelError::MultipleMasks { .. })
        )
    }
}

/// Invalid start-up configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one of --mlm-model or --classifier-model must be given")]
    NoModel,
    #[error("--{tokenizer_flag} was given without --{model_flag}")]
    TokenizerWithoutModel {
        tokenizer_flag: &'static str,
        model_flag: &'static str,
    },
    #[error("--max-sequence-length must be greater than 0")]
    ZeroSequenceLength,
    #[error("--mask-token must not be empty")]
    EmptyMaskToken,
}
