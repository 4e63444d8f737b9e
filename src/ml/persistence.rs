use crate::error::{AppError, Result};
use crate::ml::classifier::{Classifier, LogisticRegressionClassifier};
use crate::ml::features::{FeatureExtractor, TfidfVectorizer};
use crate::ml::pipeline::SentimentPipeline;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// The two persisted training artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Vectorizer,
    Model,
}

impl Artifact {
    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::Vectorizer => "tfidf_vectorizer.bin",
            Artifact::Model => "sentiment_model.bin",
        }
    }
}

/// Paths written by [`ArtifactStore::save_all`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub model: PathBuf,
}

/// Reads and writes artifacts inside one models directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, artifact: Artifact) -> PathBuf {
        self.dir.join(artifact.file_name())
    }

    /// Serialize a value into the artifact file, replacing any previous one
    pub fn save<T: Serialize>(&self, artifact: Artifact, value: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path(artifact);
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, value)?;
        writer.flush()?;

        tracing::debug!(path = %path.display(), "Saved artifact");
        Ok(path)
    }

    /// Deserialize an artifact; every failure is reported as a model load error
    pub fn load<T: DeserializeOwned>(&self, artifact: Artifact) -> Result<T> {
        let path = self.path(artifact);
        let file = File::open(&path)
            .map_err(|e| AppError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let reader = BufReader::new(file);

        bincode::deserialize_from(reader)
            .map_err(|e| AppError::ModelLoad(format!("{}: {}", path.display(), e)))
    }

    /// Save the fitted vectorizer and model side by side
    pub fn save_all<V: Serialize, M: Serialize>(
        &self,
        vectorizer: &V,
        model: &M,
    ) -> Result<ArtifactPaths> {
        Ok(ArtifactPaths {
            vectorizer: self.save(Artifact::Vectorizer, vectorizer)?,
            model: self.save(Artifact::Model, model)?,
        })
    }

    /// Load both artifacts and assemble the prediction pipeline
    pub fn load_pipeline(&self) -> Result<SentimentPipeline> {
        let vectorizer: TfidfVectorizer = self.load(Artifact::Vectorizer)?;
        let model: LogisticRegressionClassifier = self.load(Artifact::Model)?;

        tracing::info!(
            models_dir = %self.dir.display(),
            features = vectorizer.n_features(),
            trained_at = %model.metadata().trained_at,
            "Loaded model artifacts"
        );

        SentimentPipeline::new(Box::new(vectorizer), Box::new(model))
            .map_err(|e| AppError::ModelLoad(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_file_names() {
        let store = ArtifactStore::new("models");
        assert_eq!(
            store.path(Artifact::Vectorizer),
            PathBuf::from("models/tfidf_vectorizer.bin")
        );
        assert_eq!(
            store.path(Artifact::Model),
            PathBuf::from("models/sentiment_model.bin")
        );
    }

    #[test]
    fn test_missing_artifact_is_model_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let err = store.load_pipeline().err().unwrap();
        assert!(matches!(err, AppError::ModelLoad(_)));
        assert_eq!(err.error_code(), "MODEL_LOAD_ERROR");
    }

    #[test]
    fn test_truncated_artifact_is_model_load_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sentiment_model.bin"), b"abc").unwrap();

        let store = ArtifactStore::new(dir.path());
        let result: Result<LogisticRegressionClassifier> = store.load(Artifact::Model);
        assert!(matches!(result, Err(AppError::ModelLoad(_))));
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nested").join("models"));

        let path = store.save(Artifact::Model, &vec![1.0_f64, 2.0]).unwrap();
        assert!(path.exists());

        let loaded: Vec<f64> = store.load(Artifact::Model).unwrap();
        assert_eq!(loaded, vec![1.0, 2.0]);
    }
}
