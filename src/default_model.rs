//! Process-wide default model
//!
//! The bundled English model is compiled in and parsed on first use. Set
//! `GIBDETECT_MODEL` to a model file path to use that instead.

use crate::model::{Model, ModelError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Environment variable overriding the default model path
pub const MODEL_ENV_VAR: &str = "GIBDETECT_MODEL";

/// Bundled model, trained from `data/corpus.txt`, `data/good.txt` and
/// `data/bad.txt`.
pub const BUNDLED_MODEL_JSON: &str = include_str!("../data/en_model.json");

/// Global default model instance, or the error from the one load attempt
static DEFAULT_MODEL: OnceLock<Result<Model, DefaultModelError>> = OnceLock::new();

/// The default model could not be loaded. Every caller sees the same
/// underlying error.
#[derive(Error, Debug, Clone)]
#[error("failed to load default model from {source_name}: {error}")]
pub struct DefaultModelError {
    pub source_name: String,
    pub error: Arc<ModelError>,
}

/// Get or initialize the default model.
///
/// Exactly one thread performs the load; concurrent callers wait for it and
/// then share the result.
pub fn default_model() -> Result<&'static Model, DefaultModelError> {
    DEFAULT_MODEL
        .get_or_init(|| init_default(std::env::var_os(MODEL_ENV_VAR).map(PathBuf::from)))
        .as_ref()
        .map_err(Clone::clone)
}

/// Load the default model from `path` (or the bundled one), naming the
/// source that was actually tried in any error.
fn init_default(path: Option<PathBuf>) -> Result<Model, DefaultModelError> {
    let source_name = source_name(path.as_deref());
    load_default(path).map_err(|error| DefaultModelError {
        source_name,
        error: Arc::new(error),
    })
}

/// Load the model at `path`, or the bundled model when `path` is `None`.
pub fn load_default(path: Option<PathBuf>) -> Result<Model, ModelError> {
    match path {
        Some(path) => {
            tracing::debug!("Loading default model from {}", path.display());
            Model::load(&path)
        }
        None => bundled_model(),
    }
}

/// Parse the compiled-in model. Not cached.
pub fn bundled_model() -> Result<Model, ModelError> {
    Model::from_json_str(BUNDLED_MODEL_JSON)
}

fn source_name(path: Option<&Path>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "bundled model".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_model_is_valid() {
        let model = bundled_model().unwrap();
        assert_eq!(model.alphabet().len(), 27);
        assert_eq!(model.log_probs().dim(), 27);
        assert!(model.threshold() > 0.0 && model.threshold() < 1.0);
    }

    #[test]
    fn test_bundled_model_rows_are_distributions() {
        let model = bundled_model().unwrap();
        for row in model.log_probs().rows() {
            let total: f64 = row.iter().map(|lp| lp.exp()).sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bundled_model_classifies_training_examples() {
        let model = bundled_model().unwrap();
        for text in include_str!("../data/good.txt").lines() {
            assert!(!model.is_gibberish(text), "{:?} flagged", text);
        }
        for text in include_str!("../data/bad.txt").lines() {
            assert!(model.is_gibberish(text), "{:?} not flagged", text);
        }
    }

    #[test]
    fn test_load_default_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, BUNDLED_MODEL_JSON).unwrap();

        let loaded = load_default(Some(path)).unwrap();
        assert_eq!(loaded, bundled_model().unwrap());
    }

    #[test]
    fn test_init_error_names_the_path_tried() {
        let path = PathBuf::from("/nonexistent/gibdetect/model.json");
        let err = init_default(Some(path.clone())).unwrap_err();
        assert_eq!(err.source_name, path.display().to_string());
        assert!(matches!(*err.error, ModelError::Io(_)));
        assert!(err.to_string().contains("/nonexistent/gibdetect/model.json"));
    }

    #[test]
    fn test_init_without_path_uses_bundled() {
        let model = init_default(None).unwrap();
        assert_eq!(model, bundled_model().unwrap());
        assert_eq!(source_name(None), "bundled model");
    }

    #[test]
    fn test_load_default_missing_file() {
        let result = load_default(Some(PathBuf::from("/nonexistent/gibdetect/model.json")));
        assert!(matches!(result, Err(ModelError::Io(_))));
    }
}
