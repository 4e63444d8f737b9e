use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::ml::metrics::{ConfusionMatrix, EvaluationMetrics};
use crate::ml::models::{ClassifierConfig, Label, PredictionResult, VectorizerConfig};

pub const RESULTS_FILE: &str = "training_results.json";
pub const CLASSIFICATION_REPORT_FILE: &str = "classification_report.txt";

/// Summary of one training run, written as `training_results.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub timestamp: DateTime<Utc>,
    pub dataset: String,
    pub model: String,
    pub training_samples: usize,
    pub test_samples: usize,
    pub features: usize,
    pub training_time_seconds: f64,
    pub vectorization_time_seconds: f64,
    pub metrics: ReportMetrics,
    pub confusion_matrix: ConfusionMatrix,
    pub hyperparameters: ReportHyperparameters,
}

/// Metrics rounded to four decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl ReportMetrics {
    pub fn new(train_accuracy: f64, test: &EvaluationMetrics) -> Self {
        Self {
            train_accuracy: round_to(train_accuracy, 4),
            test_accuracy: round_to(test.accuracy, 4),
            precision: round_to(test.precision, 4),
            recall: round_to(test.recall, 4),
            f1_score: round_to(test.f1_score, 4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHyperparameters {
    pub tfidf_max_features: Option<usize>,
    pub tfidf_ngram_range: String,
    #[serde(rename = "lr_C")]
    pub lr_c: f64,
    pub lr_max_iter: usize,
    pub lr_solver: String,
}

impl ReportHyperparameters {
    pub fn new(vectorizer: &VectorizerConfig, classifier: &ClassifierConfig) -> Self {
        let (min_n, max_n) = vectorizer.ngram_range;
        Self {
            tfidf_max_features: vectorizer.max_features,
            tfidf_ngram_range: format!("({}, {})", min_n, max_n),
            lr_c: classifier.c,
            lr_max_iter: classifier.max_iter,
            lr_solver: classifier.solver.to_string(),
        }
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl TrainingReport {
    /// Write pretty JSON into `dir`, creating it when missing
    pub fn write_json(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let path = dir.join(RESULTS_FILE);
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;

        Ok(path)
    }

    /// Human readable performance block printed after training
    pub fn summary(&self) -> String {
        let rule = "=".repeat(50);
        let m = &self.metrics;
        format!(
            "{rule}\nMODEL PERFORMANCE\n{rule}\n\
             Training Accuracy:   {:.4} ({:.2}%)\n\
             Test Accuracy:       {:.4} ({:.2}%)\n\n\
             Test Set Metrics:\n\
             \x20 Precision:         {:.4}\n\
             \x20 Recall:            {:.4}\n\
             \x20 F1-Score:          {:.4}\n\n\
             Confusion Matrix:\n{}",
            m.train_accuracy,
            m.train_accuracy * 100.0,
            m.test_accuracy,
            m.test_accuracy * 100.0,
            m.precision,
            m.recall,
            m.f1_score,
            self.confusion_matrix.render()
        )
    }
}

/// Write the classification report text into `dir`
pub fn write_classification_report(dir: impl AsRef<Path>, text: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(CLASSIFICATION_REPORT_FILE);
    fs::write(&path, text)?;
    Ok(path)
}

/// One numbered sample prediction, texts over 60 chars are shortened
pub fn format_sample_prediction(index: usize, prediction: &PredictionResult) -> String {
    let text = &prediction.text;
    let shown = if text.chars().count() > 60 {
        format!("\"{}...\"", text.chars().take(60).collect::<String>())
    } else {
        format!("\"{}\"", text)
    };

    let sentiment = match prediction.sentiment {
        Label::Positive => "Positive",
        Label::Negative => "Negative",
    };

    format!(
        "{}. {}\n   → {} (confidence: {:.2}%)",
        index,
        shown,
        sentiment,
        prediction.confidence * 100.0
    )
}
