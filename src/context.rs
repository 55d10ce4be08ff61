use std::sync::Arc;

use tracing::info;

use crate::{
    config::ServeArgs,
    error::ModelError,
    model::{ClassifierModel, MaskScorer, MaskedLmModel, PairClassifier},
};

/// Models shared read-only by every request. Built once at start-up.
#[derive(Clone, Default)]
pub struct AppContext {
    pub mlm: Option<Arc<dyn MaskScorer>>,
    pub classifier: Option<Arc<dyn PairClassifier>>,
}

impl AppContext {
    /// Loads whichever models the arguments name.
    pub fn load(args: &ServeArgs) -> Result<Self, ModelError> {
        let mlm = match args.mlm_paths() {
            Some(paths) => {
                info!("initializing masked-language model");
                let model = MaskedLmModel::new(&paths, &args.mask_token, args.intra_threads)?;
                Some(Arc::new(model) as Arc<dyn MaskScorer>)
            }
            None => None,
        };

        let classifier = match args.classifier_paths() {
            Some(paths) => {
                info!("initializing sequence classifier");
                let model =
                    ClassifierModel::new(&paths, args.max_sequence_length, args.intra_threads)?;
                Some(Arc::new(model) as Arc<dyn PairClassifier>)
            }
            None => None,
        };

        Ok(Self { mlm, classifier })
    }

    pub fn with_mlm(mut self, scorer: Arc<dyn MaskScorer>) -> Self {
        self.mlm = Some(scorer);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn PairClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }
}
