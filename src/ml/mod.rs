/// Machine learning core for review sentiment classification
///
/// This module provides:
/// - Deterministic text normalization
/// - TF-IDF feature extraction over word unigrams and bigrams
/// - Logistic regression classification with calibrated probabilities
/// - Evaluation metrics and the classification report
/// - Artifact persistence and the prediction pipeline

pub mod classifier;
pub mod features;
pub mod metrics;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod preprocess;
pub mod stop_words;

pub use classifier::{Classifier, LogisticRegressionClassifier};
pub use features::{FeatureExtractor, SparseVector, TfidfVectorizer};
pub use metrics::{ClassificationReport, ConfusionMatrix, EvaluationMetrics};
pub use models::{
    ClassProbabilities, ClassifierConfig, Label, ModelMetadata, PredictionResult, Review,
    VectorizerConfig,
};
pub use persistence::{Artifact, ArtifactPaths, ArtifactStore};
pub use pipeline::SentimentPipeline;
pub use preprocess::{normalize, TextPreprocessor};
