pub mod candidates;
pub mod config;
pub mod context;
pub mod disambiguate;
pub mod error;
pub mod model;
pub mod query;
pub mod segment;
pub mod server;
pub mod words;

use std::path::PathBuf;

pub use candidates::{Candidate, Interpretation};
pub use context::AppContext;
pub use disambiguate::{ClassifierPrediction, MaskPrediction};
pub use error::DisambiguationError;
pub use model::{ClassifierModel, MaskScorer, MaskedLmModel, ModelPaths, PairClassifier};
pub use segment::Segment;

const DEFAULT_MASK_TOKEN: &str = "<mask>";
const DEFAULT_INTRA_THREADS: usize = 4;

/// Masked-language die/dat prediction from local model files.
pub struct DieDat {
    inner: MaskedLmModel,
}

impl DieDat {
    pub fn new(model_path: &str, tokenizer_path: &str) -> Result<Self, DisambiguationError> {
        let paths = ModelPaths {
            model: PathBuf::from(model_path),
            tokenizer: PathBuf::from(tokenizer_path),
        };
        Ok(Self {
            inner: MaskedLmModel::new(&paths, DEFAULT_MASK_TOKEN, DEFAULT_INTRA_THREADS)?,
        })
    }

    /// Predicts the word for the single `_die_`/`_dat_` marker in `sentence`.
    pub fn predict(&self, sentence: &str) -> Result<MaskPrediction, DisambiguationError> {
        disambiguate::predict_marked(&self.inner, sentence)
    }

    /// Predicts every bare die/dat in `sentence`.
    pub fn mark_all(&self, sentence: &str) -> Result<Vec<Segment>, DisambiguationError> {
        segment::segment(&self.inner, sentence)
    }
}
