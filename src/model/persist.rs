//! Model file schema and I/O
//!
//! Models are stored as JSON:
//!
//! ```json
//! {
//!   "log_prob_mat": [[-2.9, -3.1, ...], ...],
//!   "accepted_chars": "abcdefghijklmnopqrstuvwxyz ",
//!   "pos": {"a": 0, "b": 1, ...},
//!   "threshold": 0.052
//! }
//! ```
//!
//! Loading validates the shape before a [`Model`] is built, so a bad file
//! fails here instead of producing wrong scores later.

use super::alphabet::{Alphabet, AlphabetError};
use super::{LogProbMatrix, Model, TransitionModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur while loading or saving a model
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid accepted_chars: {0}")]
    Alphabet(#[from] AlphabetError),

    #[error("malformed model: {0}")]
    Malformed(String),
}

/// On-disk representation of a [`Model`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub log_prob_mat: Vec<Vec<f64>>,
    pub accepted_chars: String,
    pub pos: BTreeMap<String, usize>,
    pub threshold: f64,
}

impl From<&Model> for ModelFile {
    fn from(model: &Model) -> Self {
        let alphabet = model.alphabet();
        Self {
            log_prob_mat: model.log_probs().rows().map(<[f64]>::to_vec).collect(),
            accepted_chars: alphabet.as_string(),
            pos: alphabet
                .chars()
                .iter()
                .enumerate()
                .map(|(idx, ch)| (ch.to_string(), idx))
                .collect(),
            threshold: model.threshold(),
        }
    }
}

impl TryFrom<ModelFile> for Model {
    type Error = ModelError;

    fn try_from(file: ModelFile) -> Result<Self, Self::Error> {
        let alphabet = Alphabet::new(&file.accepted_chars)?;
        let k = alphabet.len();

        if file.log_prob_mat.len() != k {
            return Err(ModelError::Malformed(format!(
                "log_prob_mat has {} rows but accepted_chars has {} characters",
                file.log_prob_mat.len(),
                k
            )));
        }

        let mut cells = Vec::with_capacity(k * k);
        for (i, row) in file.log_prob_mat.iter().enumerate() {
            if row.len() != k {
                return Err(ModelError::Malformed(format!(
                    "log_prob_mat row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    k
                )));
            }
            // -inf is a legal log(0); NaN and +inf are not
            if let Some(j) = row.iter().position(|v| v.is_nan() || *v == f64::INFINITY) {
                return Err(ModelError::Malformed(format!(
                    "log_prob_mat[{}][{}] is {}",
                    i, j, row[j]
                )));
            }
            cells.extend_from_slice(row);
        }

        if !file.threshold.is_finite() {
            return Err(ModelError::Malformed(format!(
                "threshold is {}",
                file.threshold
            )));
        }

        validate_pos(&file.pos, &alphabet)?;

        let log_probs = LogProbMatrix::from_cells(k, cells);
        Ok(TransitionModel::new(alphabet, log_probs).with_threshold(file.threshold))
    }
}

/// `pos` must map exactly the alphabet characters to their positions.
fn validate_pos(pos: &BTreeMap<String, usize>, alphabet: &Alphabet) -> Result<(), ModelError> {
    if pos.len() != alphabet.len() {
        return Err(ModelError::Malformed(format!(
            "pos has {} entries but accepted_chars has {} characters",
            pos.len(),
            alphabet.len()
        )));
    }
    for (key, &idx) in pos {
        let mut chars = key.chars();
        let ch = match (chars.next(), chars.next()) {
            (Some(ch), None) => ch,
            _ => {
                return Err(ModelError::Malformed(format!(
                    "pos key {:?} is not a single character",
                    key
                )))
            }
        };
        if alphabet.index_of(ch) != Some(idx) {
            return Err(ModelError::Malformed(format!(
                "pos maps {:?} to {}, inconsistent with accepted_chars",
                ch, idx
            )));
        }
    }
    Ok(())
}

impl Model {
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let file: ModelFile = serde_json::from_str(json)?;
        file.try_into()
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        let file: ModelFile = serde_json::from_reader(reader)?;
        file.try_into()
    }

    /// Load a model from a JSON file
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let file = File::open(path)?;
        let model = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(
            "Loaded model from {} (k={}, threshold={})",
            path.display(),
            model.alphabet().len(),
            model.threshold()
        );
        Ok(model)
    }

    pub fn to_json_string(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(&ModelFile::from(self))?)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), ModelError> {
        serde_json::to_writer(writer, &ModelFile::from(self))?;
        Ok(())
    }

    /// Save the model as JSON, replacing `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let parent_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            self.to_writer(&mut writer)?;
            writer.flush()?;
        }
        temp_file.persist(path).map_err(|e| e.error)?;

        tracing::debug!("Saved model to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{train, TrainConfig};

    fn trained() -> Model {
        train(
            [
                "the old man walked down to the harbor in the evening",
                "children played near the water and built castles of sand",
            ],
            ["the harbor"],
            ["qxzjvk"],
            &TrainConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_json_round_trip_is_exact() {
        let model = trained();
        let json = model.to_json_string().unwrap();
        let loaded = Model::from_json_str(&json).unwrap();

        assert_eq!(loaded, model);
        assert_eq!(loaded.threshold().to_bits(), model.threshold().to_bits());
        for text in ["", "the water", "qxzjvk", "Hello, World!"] {
            assert_eq!(
                loaded.avg_transition_prob(text).to_bits(),
                model.avg_transition_prob(text).to_bits()
            );
            assert_eq!(loaded.is_gibberish(text), model.is_gibberish(text));
        }
    }

    #[test]
    fn test_save_load() {
        let model = trained();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");

        model.save(&path).unwrap();
        let loaded = Model::load(&path).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_file_fields() {
        let model = trained();
        let file = ModelFile::from(&model);
        assert_eq!(file.accepted_chars, "abcdefghijklmnopqrstuvwxyz ");
        assert_eq!(file.log_prob_mat.len(), 27);
        assert_eq!(file.pos.get(" "), Some(&26));
        assert_eq!(file.pos.get("a"), Some(&0));
    }

    fn valid_file() -> ModelFile {
        ModelFile {
            log_prob_mat: vec![vec![-0.5, -1.0], vec![-1.0, -0.5]],
            accepted_chars: "ab".to_string(),
            pos: [("a".to_string(), 0), ("b".to_string(), 1)].into_iter().collect(),
            threshold: 0.1,
        }
    }

    #[test]
    fn test_valid_file_loads() {
        let model = Model::try_from(valid_file()).unwrap();
        assert_eq!(model.alphabet().len(), 2);
        assert_eq!(model.log_probs().get(1, 0), -1.0);
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = r#"{"log_prob_mat": [[0.0]], "accepted_chars": "a", "pos": {"a": 0}}"#;
        assert!(matches!(Model::from_json_str(json), Err(ModelError::Json(_))));
    }

    #[test]
    fn test_row_count_mismatch_rejected() {
        let mut file = valid_file();
        file.log_prob_mat.pop();
        assert!(matches!(Model::try_from(file), Err(ModelError::Malformed(_))));
    }

    #[test]
    fn test_column_count_mismatch_rejected() {
        let mut file = valid_file();
        file.log_prob_mat[1].push(-2.0);
        assert!(matches!(Model::try_from(file), Err(ModelError::Malformed(_))));
    }

    #[test]
    fn test_inconsistent_pos_rejected() {
        let mut file = valid_file();
        file.pos.insert("a".to_string(), 1);
        assert!(matches!(Model::try_from(file), Err(ModelError::Malformed(_))));

        let mut file = valid_file();
        file.pos.insert("c".to_string(), 2);
        assert!(matches!(Model::try_from(file), Err(ModelError::Malformed(_))));

        let mut file = valid_file();
        file.pos.remove("b");
        file.pos.insert("bb".to_string(), 1);
        assert!(matches!(Model::try_from(file), Err(ModelError::Malformed(_))));
    }

    #[test]
    fn test_bad_alphabet_rejected() {
        let mut file = valid_file();
        file.accepted_chars = "aa".to_string();
        assert!(matches!(Model::try_from(file), Err(ModelError::Alphabet(_))));
    }

    #[test]
    fn test_nan_rejected() {
        let mut file = valid_file();
        file.log_prob_mat[0][1] = f64::NAN;
        assert!(matches!(Model::try_from(file), Err(ModelError::Malformed(_))));

        let mut file = valid_file();
        file.threshold = f64::INFINITY;
        assert!(matches!(Model::try_from(file), Err(ModelError::Malformed(_))));
    }
}
