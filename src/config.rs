use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::dataset::{DatasetSource, ImdbDirectorySource, JsonlSource};
use crate::error::{AppError, Result};
use crate::ml::models::{ClassifierConfig, VectorizerConfig};

/// Environment variable naming an optional configuration file
pub const CONFIG_PATH_ENV: &str = "SENTIMENT_CONFIG";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Artifact and report locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Training data location
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// TF-IDF vectorizer hyperparameters
    #[serde(default)]
    pub vectorizer: VectorizerConfig,

    /// Logistic regression hyperparameters
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the embedded defaults, an optional file and the environment
    ///
    /// The file is `path` when given, otherwise the one named by `SENTIMENT_CONFIG`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut builder = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ));

        // An explicitly named file must exist
        if let Some(config_path) = &config_path {
            builder = builder.add_source(config::File::from(config_path.as_path()).required(true));
        }

        let config: Config = builder
            // Override with environment variables (prefix: SENTIMENT__)
            .add_source(
                config::Environment::with_prefix("SENTIMENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check hyperparameter bounds
    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.classifier.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the persisted vectorizer and model
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Directory receiving the training reports
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            results_dir: default_results_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset name recorded in the training report
    #[serde(default = "default_dataset_name")]
    pub name: String,

    /// Corpus title used in report and banner headings
    #[serde(default = "default_dataset_title")]
    pub title: String,

    /// aclImdb directory tree
    pub dir: Option<PathBuf>,

    /// JSON-lines training split
    pub train_file: Option<PathBuf>,

    /// JSON-lines test split
    pub test_file: Option<PathBuf>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            name: default_dataset_name(),
            title: default_dataset_title(),
            dir: None,
            train_file: None,
            test_file: None,
        }
    }
}

impl DatasetConfig {
    /// Build the configured source; a directory wins over JSON-lines files
    pub fn source(&self) -> Result<Box<dyn DatasetSource>> {
        if let Some(dir) = &self.dir {
            return Ok(Box::new(ImdbDirectorySource::new(&self.name, dir)));
        }

        match (&self.train_file, &self.test_file) {
            (Some(train), Some(test)) => Ok(Box::new(JsonlSource::new(&self.name, train, test))),
            (None, None) => Err(AppError::Configuration(
                "No dataset configured: set dataset.dir or dataset.train_file and dataset.test_file"
                    .to_string(),
            )),
            _ => Err(AppError::Configuration(
                "dataset.train_file and dataset.test_file must be set together".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_dataset_name() -> String {
    "IMDB 50K".to_string()
}

fn default_dataset_title() -> String {
    "IMDB".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::models::StopWords;

    #[test]
    fn test_embedded_defaults_match_default() {
        let embedded: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(embedded, Config::default());
    }

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.paths.models_dir, PathBuf::from("models"));
        assert_eq!(config.paths.results_dir, PathBuf::from("results"));
        assert_eq!(config.dataset.name, "IMDB 50K");
        assert_eq!(config.dataset.title, "IMDB");
        assert_eq!(config.vectorizer.stop_words, StopWords::English);
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.observability.json_logs);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentiment.toml");
        std::fs::write(
            &path,
            "[paths]\nmodels_dir = \"/tmp/m\"\n\n[vectorizer]\nmin_df = 2\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.paths.models_dir, PathBuf::from("/tmp/m"));
        assert_eq!(config.paths.results_dir, PathBuf::from("results"));
        assert_eq!(config.vectorizer.min_df, 2);
        assert_eq!(config.vectorizer.max_df, 0.8);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let err = Config::load(Some(Path::new("/nonexistent/sentiment.toml"))).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[vectorizer]\nmax_df = 1.5\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_unsupported_max_iter_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iters.toml");
        std::fs::write(&path, "[classifier]\nmax_iter = 5000\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_dataset_source_selection() {
        let mut dataset = DatasetConfig::default();
        assert!(matches!(dataset.source(), Err(AppError::Configuration(_))));

        dataset.train_file = Some(PathBuf::from("train.jsonl"));
        assert!(matches!(dataset.source(), Err(AppError::Configuration(_))));

        dataset.test_file = Some(PathBuf::from("test.jsonl"));
        assert_eq!(dataset.source().unwrap().name(), "IMDB 50K");

        dataset.dir = Some(PathBuf::from("aclImdb"));
        assert!(dataset.source().is_ok());
    }
}
