//! Command-line and environment configuration for `diedat-server`.
//! Every flag falls back to a `DIEDAT_`-prefixed environment variable.

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::Parser;

use crate::{error::ConfigError, model::ModelPaths};

const TOKENIZER_FILE: &str = "tokenizer.json";

/// Serve die/dat disambiguation over HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "diedat-server", version)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "DIEDAT_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// ONNX export of the masked-language model. Enables the `/disambiguation/mlm` routes.
    #[arg(long, env = "DIEDAT_MLM_MODEL")]
    pub mlm_model: Option<PathBuf>,

    /// Tokenizer for the masked-language model. Defaults to `tokenizer.json` next to the model.
    #[arg(long, env = "DIEDAT_MLM_TOKENIZER")]
    pub mlm_tokenizer: Option<PathBuf>,

    /// ONNX export of the finetuned classifier. Enables `/disambiguation/classifier`.
    #[arg(long, env = "DIEDAT_CLASSIFIER_MODEL")]
    pub classifier_model: Option<PathBuf>,

    /// Tokenizer for the classifier. Defaults to `tokenizer.json` next to the model.
    #[arg(long, env = "DIEDAT_CLASSIFIER_TOKENIZER")]
    pub classifier_tokenizer: Option<PathBuf>,

    /// Mask placeholder of the masked-language model's vocabulary.
    #[arg(long, env = "DIEDAT_MASK_TOKEN", default_value = "<mask>")]
    pub mask_token: String,

    /// Fixed token length classifier inputs are truncated and padded to.
    #[arg(long, env = "DIEDAT_MAX_SEQUENCE_LENGTH", default_value_t = 512)]
    pub max_sequence_length: usize,

    /// Intra-op threads per ONNX session.
    #[arg(long, env = "DIEDAT_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl ServeArgs {
    /// Checks flag combinations clap cannot express.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when no model is configured, a tokenizer is
    /// given without its model, or a numeric or token setting is empty.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.mlm_model.is_none() && self.classifier_model.is_none() {
            return Err(ConfigError::NoModel);
        }
        if self.mlm_tokenizer.is_some() && self.mlm_model.is_none() {
            return Err(ConfigError::TokenizerWithoutModel {
                tokenizer_flag: "mlm-tokenizer",
                model_flag: "mlm-model",
            });
        }
        if self.classifier_tokenizer.is_some() && self.classifier_model.is_none() {
            return Err(ConfigError::TokenizerWithoutModel {
                tokenizer_flag: "classifier-tokenizer",
                model_flag: "classifier-model",
            });
        }
        if self.max_sequence_length == 0 {
            return Err(ConfigError::ZeroSequenceLength);
        }
        if self.mask_token.is_empty() {
            return Err(ConfigError::EmptyMaskToken);
        }
        Ok(self)
    }

    pub fn mlm_paths(&self) -> Option<ModelPaths> {
        model_paths(self.mlm_model.as_deref(), self.mlm_tokenizer.as_deref())
    }

    pub fn classifier_paths(&self) -> Option<ModelPaths> {
        model_paths(
            self.classifier_model.as_deref(),
            self.classifier_tokenizer.as_deref(),
        )
    }
}

fn model_paths(model: Option<&Path>, tokenizer: Option<&Path>) -> Option<ModelPaths> {
    let model = model?;
    let tokenizer = tokenizer
        .map(Path::to_path_buf)
        .unwrap_or_else(|| model.with_file_name(TOKENIZER_FILE));
    Some(ModelPaths {
        model: model.to_path_buf(),
        tokenizer,
    })
}
