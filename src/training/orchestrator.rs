use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use super::report::{self, ReportHyperparameters, ReportMetrics, TrainingReport};
use crate::config::Config;
use crate::dataset::DatasetSource;
use crate::error::Result;
use crate::ml::classifier::{Classifier, LogisticRegressionClassifier};
use crate::ml::features::{FeatureExtractor, SparseVector, TfidfVectorizer};
use crate::ml::metrics;
use crate::ml::models::{Label, PredictionResult};
use crate::ml::persistence::{ArtifactPaths, ArtifactStore};
use crate::ml::pipeline::{self, SentimentPipeline};
use crate::ml::preprocess::TextPreprocessor;

/// Reviews classified after every training run
pub const SAMPLE_REVIEWS: [&str; 5] = [
    "This movie was absolutely amazing! Best film I've seen in years.",
    "Terrible movie, waste of time. Very disappointed.",
    "It was okay, nothing special but not bad either.",
    "Masterpiece! The acting was superb and the plot kept me engaged.",
    "Boring and predictable. Would not recommend.",
];

/// Everything a training run produced
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub report: TrainingReport,
    pub classification_report: String,
    pub artifacts: ArtifactPaths,
    pub results_path: PathBuf,
    pub classification_report_path: PathBuf,
    pub sample_predictions: Vec<PredictionResult>,
}

/// Runs the batch training workflow over one dataset source
pub struct TrainingOrchestrator<S, E, C> {
    config: Config,
    source: S,
    extractor: E,
    classifier: C,
}

impl<S> TrainingOrchestrator<S, TfidfVectorizer, LogisticRegressionClassifier>
where
    S: DatasetSource,
{
    /// TF-IDF vectorizer and logistic regression built from the configuration
    pub fn from_config(config: Config, source: S) -> Self {
        let extractor = TfidfVectorizer::new(config.vectorizer.clone());
        let classifier = LogisticRegressionClassifier::new(config.classifier.clone());
        Self::new(config, source, extractor, classifier)
    }
}

impl<S, E, C> TrainingOrchestrator<S, E, C>
where
    S: DatasetSource,
    E: FeatureExtractor + Serialize + 'static,
    C: Classifier + Serialize + 'static,
{
    pub fn new(config: Config, source: S, extractor: E, classifier: C) -> Self {
        Self {
            config,
            source,
            extractor,
            classifier,
        }
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Load, preprocess, fit, evaluate, persist and report
    pub fn run(&mut self) -> Result<TrainingOutcome> {
        let paths = self.config.paths.clone();

        info!("[1/6] Loading {} dataset...", self.source.name());
        let splits = self.source.load()?;
        splits.validate()?;
        info!(
            train = splits.train.len(),
            test = splits.test.len(),
            "✓ Dataset loaded"
        );

        info!("[2/6] Preprocessing text data...");
        let train_texts = TextPreprocessor::normalize_all(&splits.train_texts());
        let test_texts = TextPreprocessor::normalize_all(&splits.test_texts());
        let train_labels = splits.train_labels();
        let test_labels = splits.test_labels();
        info!("✓ Preprocessing complete");

        info!(
            max_features = ?self.extractor.config().max_features,
            ngram_range = ?self.extractor.config().ngram_range,
            "[3/6] Creating TF-IDF features..."
        );
        let started = Instant::now();
        // The vocabulary is learned from the training split only
        let x_train = self.extractor.fit_transform(&train_texts)?;
        let x_test = self.transform_all(&test_texts)?;
        let vectorization_time = started.elapsed().as_secs_f64();
        let n_features = self.extractor.n_features();
        info!(
            features = n_features,
            train_shape = ?(x_train.len(), n_features),
            test_shape = ?(x_test.len(), n_features),
            "✓ TF-IDF vectorization complete ({:.2}s)",
            vectorization_time
        );

        let hyperparameters = &self.classifier.metadata().hyperparameters;
        info!(
            c = hyperparameters.c,
            max_iter = hyperparameters.max_iter,
            solver = %hyperparameters.solver,
            "[4/6] Training Logistic Regression model..."
        );
        let started = Instant::now();
        self.classifier.fit(&x_train, &train_labels)?;
        let training_time = started.elapsed().as_secs_f64();
        info!("✓ Training complete ({:.2}s)", training_time);

        info!("[5/6] Evaluating model performance...");
        let train_preds = self.predict_all(&x_train)?;
        let test_preds = self.predict_all(&x_test)?;
        let train_accuracy = metrics::accuracy(&train_labels, &train_preds)?;
        let test_metrics = metrics::evaluate(&test_labels, &test_preds)?;
        let classification_report = metrics::classification_report(
            &self.config.dataset.title,
            &test_labels,
            &test_preds,
        )?;
        info!(
            train_accuracy = train_accuracy,
            test_accuracy = test_metrics.accuracy,
            precision = test_metrics.precision,
            recall = test_metrics.recall,
            f1_score = test_metrics.f1_score,
            "✓ Evaluation complete"
        );

        info!("[6/6] Saving model and results...");
        let store = ArtifactStore::new(&paths.models_dir);
        let artifacts = store.save_all(&self.extractor, &self.classifier)?;
        info!(path = %artifacts.model.display(), "✓ Model saved");
        info!(path = %artifacts.vectorizer.display(), "✓ Vectorizer saved");

        let report = TrainingReport {
            timestamp: chrono::Utc::now(),
            dataset: self.source.name().to_string(),
            model: self.classifier.metadata().name.clone(),
            training_samples: train_texts.len(),
            test_samples: test_texts.len(),
            features: n_features,
            training_time_seconds: report::round_to(training_time, 2),
            vectorization_time_seconds: report::round_to(vectorization_time, 2),
            metrics: ReportMetrics::new(train_accuracy, &test_metrics),
            confusion_matrix: test_metrics.confusion_matrix,
            hyperparameters: ReportHyperparameters::new(
                self.extractor.config(),
                &self.classifier.metadata().hyperparameters,
            ),
        };

        let results_path = report.write_json(&paths.results_dir)?;
        info!(path = %results_path.display(), "✓ Results saved");
        let classification_report_path =
            report::write_classification_report(&paths.results_dir, &classification_report)?;
        info!(
            path = %classification_report_path.display(),
            "✓ Classification report saved"
        );

        let sample_predictions = self.predict_samples()?;

        Ok(TrainingOutcome {
            report,
            classification_report,
            artifacts,
            results_path,
            classification_report_path,
            sample_predictions,
        })
    }

    /// Hand the fitted parts over to a prediction pipeline
    pub fn into_pipeline(self) -> Result<SentimentPipeline> {
        SentimentPipeline::new(Box::new(self.extractor), Box::new(self.classifier))
    }

    fn transform_all(&self, texts: &[String]) -> Result<Vec<SparseVector>> {
        texts.iter().map(|t| self.extractor.transform(t)).collect()
    }

    fn predict_all(&self, features: &[SparseVector]) -> Result<Vec<Label>> {
        features.iter().map(|x| self.classifier.predict(x)).collect()
    }

    fn predict_samples(&self) -> Result<Vec<PredictionResult>> {
        let mut predictions = Vec::with_capacity(SAMPLE_REVIEWS.len());
        for text in SAMPLE_REVIEWS {
            let prediction = pipeline::predict_with(&self.extractor, &self.classifier, text)?;
            info!(
                sentiment = %prediction.sentiment,
                confidence = prediction.confidence,
                "Sample: {}",
                text
            );
            predictions.push(prediction);
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetSplits, InMemorySource};
    use crate::ml::models::{ClassifierConfig, Review, VectorizerConfig};

    fn toy_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.paths.models_dir = dir.join("models");
        config.paths.results_dir = dir.join("results");
        config.vectorizer = VectorizerConfig {
            min_df: 1,
            max_df: 1.0,
            ..VectorizerConfig::default()
        };
        config
    }

    fn toy_source() -> InMemorySource {
        let train = vec![
            Review::new("A great movie, loved it!", Label::Positive),
            Review::new("Wonderful acting and a great plot.", Label::Positive),
            Review::new("Terrible film. A waste of time.", Label::Negative),
            Review::new("Boring, terrible and predictable.", Label::Negative),
        ];
        let test = vec![
            Review::new("Great acting, xylophonic score", Label::Positive),
            Review::new("Predictable and boring", Label::Negative),
            Review::new("What a waste", Label::Negative),
        ];
        InMemorySource::new("toy", DatasetSplits::new(train, test))
    }

    #[test]
    fn test_run_writes_artifacts_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let mut orchestrator = TrainingOrchestrator::from_config(toy_config(dir.path()), toy_source());

        let outcome = orchestrator.run().unwrap();

        assert!(outcome.artifacts.vectorizer.ends_with("tfidf_vectorizer.bin"));
        assert!(outcome.artifacts.model.exists());
        assert!(outcome.results_path.exists());
        assert!(outcome.classification_report_path.exists());

        let matrix = outcome.report.confusion_matrix;
        assert_eq!(matrix.total(), outcome.report.test_samples);
        assert_eq!(outcome.report.training_samples, 4);
        assert_eq!(outcome.report.dataset, "toy");
        assert_eq!(outcome.report.model, "Logistic Regression");
        assert_eq!(outcome.sample_predictions.len(), SAMPLE_REVIEWS.len());
    }

    #[test]
    fn test_test_split_never_enters_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        let mut orchestrator = TrainingOrchestrator::from_config(toy_config(dir.path()), toy_source());
        orchestrator.run().unwrap();

        assert!(!orchestrator.extractor().contains_term("xylophonic"));
        assert!(orchestrator.extractor().contains_term("great"));
        assert_eq!(orchestrator.extractor().n_documents(), 4);
    }

    #[test]
    fn test_empty_dataset_fails_before_fitting() {
        let dir = tempfile::tempdir().unwrap();
        let source = InMemorySource::new("empty", DatasetSplits::default());
        let mut orchestrator = TrainingOrchestrator::from_config(toy_config(dir.path()), source);

        let err = orchestrator.run().unwrap_err();
        assert_eq!(err.error_code(), "DATASET_ERROR");
        assert!(!orchestrator.classifier().is_trained());
        assert!(!dir.path().join("models").exists());
    }

    #[test]
    fn test_report_describes_fitted_parts() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = TfidfVectorizer::new(VectorizerConfig {
            max_features: Some(50),
            ngram_range: (1, 1),
            min_df: 1,
            max_df: 1.0,
            ..VectorizerConfig::default()
        });
        let classifier = LogisticRegressionClassifier::new(ClassifierConfig {
            c: 0.5,
            ..ClassifierConfig::default()
        });
        let mut orchestrator =
            TrainingOrchestrator::new(toy_config(dir.path()), toy_source(), extractor, classifier);

        let hyperparameters = orchestrator.run().unwrap().report.hyperparameters;

        assert_eq!(hyperparameters.tfidf_max_features, Some(50));
        assert_eq!(hyperparameters.tfidf_ngram_range, "(1, 1)");
        assert_eq!(hyperparameters.lr_c, 0.5);
    }

    #[test]
    fn test_into_pipeline_after_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut orchestrator = TrainingOrchestrator::from_config(toy_config(dir.path()), toy_source());
        orchestrator.run().unwrap();

        let pipeline = orchestrator.into_pipeline().unwrap();
        let prediction = pipeline.predict("terrible waste").unwrap();
        assert_eq!(prediction.sentiment, Label::Negative);
    }
}
