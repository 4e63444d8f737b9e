use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::{Validate, ValidationError};

use crate::error::{AppError, Result};

/// Binary sentiment label
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Label {
    Negative = 0,
    Positive = 1,
}

impl Label {
    /// Class index used by the classifier (positive = 1)
    pub fn as_index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Label::Negative),
            1 => Ok(Label::Positive),
            other => Err(AppError::Validation(format!(
                "label must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

impl TryFrom<i64> for Label {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self> {
        if value < 0 {
            return Err(AppError::Validation(format!(
                "label must be 0 or 1, got {}",
                value
            )));
        }
        Label::from_index(value as usize)
    }
}

/// A labeled movie review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Raw review text
    pub text: String,

    /// Sentiment label
    pub label: Label,
}

impl Review {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Stop word list applied before n-grams are built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StopWords {
    English,
    None,
}

/// TF-IDF vectorizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_vectorizer_config"))]
pub struct VectorizerConfig {
    /// Keep at most this many terms, ranked by corpus frequency
    #[validate(range(min = 1))]
    pub max_features: Option<usize>,

    /// N-gram range (min, max)
    pub ngram_range: (usize, usize),

    /// Minimum number of documents a term must appear in
    #[validate(range(min = 1))]
    pub min_df: usize,

    /// Maximum fraction of documents a term may appear in
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub max_df: f64,

    /// Stop word removal
    pub stop_words: StopWords,

    /// Lowercase input before tokenizing
    pub lowercase: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: Some(10000),
            ngram_range: (1, 2), // Unigrams and bigrams
            min_df: 5,
            max_df: 0.8,
            stop_words: StopWords::English,
            lowercase: true,
        }
    }
}

fn validate_vectorizer_config(
    config: &VectorizerConfig,
) -> std::result::Result<(), ValidationError> {
    let (min_n, max_n) = config.ngram_range;
    if min_n == 0 || min_n > max_n {
        return Err(ValidationError::new("invalid_ngram_range"));
    }
    Ok(())
}

/// Solver used to fit the logistic regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Solver {
    Lbfgs,
}

/// Iteration cap built into smartcore's L-BFGS solver
pub const SOLVER_MAX_ITER: usize = 1000;

/// Logistic regression configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_classifier_config"))]
pub struct ClassifierConfig {
    /// Inverse of L2 regularization strength
    #[validate(range(exclusive_min = 0.0))]
    pub c: f64,

    /// Maximum solver iterations.
    ///
    /// The solver cannot be given a cap, so only [`SOLVER_MAX_ITER`] is
    /// accepted; the value is recorded in metadata and reports.
    pub max_iter: usize,

    /// Solver name
    pub solver: Solver,

    /// Seed recorded for reproducibility
    pub random_state: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: SOLVER_MAX_ITER,
            solver: Solver::Lbfgs,
            random_state: 42,
        }
    }
}

fn validate_classifier_config(
    config: &ClassifierConfig,
) -> std::result::Result<(), ValidationError> {
    if config.max_iter != SOLVER_MAX_ITER {
        let mut error = ValidationError::new("unsupported_max_iter");
        error.message = Some(
            format!("max_iter must be {} for the L-BFGS solver", SOLVER_MAX_ITER).into(),
        );
        return Err(error);
    }
    Ok(())
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,

    /// Model version
    pub version: String,

    /// Training timestamp
    pub trained_at: chrono::DateTime<chrono::Utc>,

    /// Number of training samples
    pub n_training_samples: usize,

    /// Number of features
    pub n_features: usize,

    /// Hyperparameters fixed at fit time
    pub hyperparameters: ClassifierConfig,
}

/// Probability of each class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub negative: f64,
    pub positive: f64,
}

impl ClassProbabilities {
    pub fn get(&self, label: Label) -> f64 {
        match label {
            Label::Negative => self.negative,
            Label::Positive => self.positive,
        }
    }
}

/// Prediction result with confidence score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Original input text
    pub text: String,

    /// Predicted sentiment
    pub sentiment: Label,

    /// Probability of the predicted class
    pub confidence: f64,

    /// Both class probabilities
    pub probabilities: ClassProbabilities,
}

impl PredictionResult {
    pub fn new(text: impl Into<String>, sentiment: Label, proba: [f64; 2]) -> Self {
        let probabilities = ClassProbabilities {
            negative: proba[0],
            positive: proba[1],
        };

        Self {
            text: text.into(),
            sentiment,
            confidence: probabilities.get(sentiment),
            probabilities,
        }
    }
}
