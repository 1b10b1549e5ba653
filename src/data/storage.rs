use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::models::Question;

pub const DEFAULT_STORE_PATH: &str = "questions.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid question JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} holds an invalid question {id}: blank {index} has no answer")]
    Invalid {
        path: PathBuf,
        id: String,
        index: usize,
    },
}

/// The whole question collection kept as one JSON array in a single file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored collection. `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<Vec<Question>>, StorageError> {
        let json_content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let questions: Vec<Question> =
            serde_json::from_str(&json_content).map_err(|source| StorageError::Json {
                path: self.path.clone(),
                source,
            })?;

        for question in &questions {
            question.validate().map_err(|index| StorageError::Invalid {
                path: self.path.clone(),
                id: question.id.clone(),
                index,
            })?;
        }

        info!(
            "loaded {} questions from {}",
            questions.len(),
            self.path.display()
        );
        Ok(Some(questions))
    }

    /// Replace the stored collection. Writes a sibling temp file then renames it over the target.
    pub fn save(&self, questions: &[Question]) -> Result<(), StorageError> {
        let io_error = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        let json = serde_json::to_string_pretty(questions).map_err(|source| {
            StorageError::Json {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(io_error)?;
        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_error(source));
        }

        info!("saved {} questions to {}", questions.len(), self.path.display());
        Ok(())
    }
}
