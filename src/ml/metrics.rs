use crate::error::{AppError, Result};
use crate::ml::models::Label;
use serde::{Deserialize, Serialize};
use std::fmt;

const TARGET_NAMES: [&str; 2] = ["Negative", "Positive"];

/// Binary confusion matrix, positive class = 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[Label], y_pred: &[Label]) -> Result<Self> {
        check_lengths(y_true, y_pred)?;

        let mut matrix = Self::default();
        for (truth, pred) in y_true.iter().zip(y_pred) {
            match (truth, pred) {
                (Label::Negative, Label::Negative) => matrix.tn += 1,
                (Label::Negative, Label::Positive) => matrix.fp += 1,
                (Label::Positive, Label::Negative) => matrix.fn_ += 1,
                (Label::Positive, Label::Positive) => matrix.tp += 1,
            }
        }
        Ok(matrix)
    }

    /// Number of evaluated samples
    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    /// Precision, recall, F1 and support for one class
    pub fn class_metrics(&self, class: Label) -> ClassMetrics {
        let (tp, fp, fn_count) = match class {
            Label::Positive => (self.tp, self.fp, self.fn_),
            Label::Negative => (self.tn, self.fn_, self.fp),
        };

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_count);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        ClassMetrics {
            precision,
            recall,
            f1_score,
            support: tp + fn_count,
        }
    }

    /// Lines used by the training report and the classification report file
    pub fn render(&self) -> String {
        format!(
            "  TN: {:5}  |  FP: {:5}\n  FN: {:5}  |  TP: {:5}\n",
            self.tn, self.fp, self.fn_, self.tp
        )
    }
}

/// Per-class metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Binary evaluation summary on one split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,

    /// Precision of the positive class
    pub precision: f64,

    /// Recall of the positive class
    pub recall: f64,

    /// F1 of the positive class
    pub f1_score: f64,

    pub confusion_matrix: ConfusionMatrix,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

fn check_lengths(y_true: &[Label], y_pred: &[Label]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(AppError::Validation(format!(
            "{} true labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(AppError::Validation(
            "Cannot evaluate an empty set of predictions".to_string(),
        ));
    }
    Ok(())
}

/// Fraction of matching labels
pub fn accuracy(y_true: &[Label], y_pred: &[Label]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Accuracy plus binary precision/recall/F1 and the confusion matrix
pub fn evaluate(y_true: &[Label], y_pred: &[Label]) -> Result<EvaluationMetrics> {
    let confusion_matrix = ConfusionMatrix::from_predictions(y_true, y_pred)?;
    let positive = confusion_matrix.class_metrics(Label::Positive);

    Ok(EvaluationMetrics {
        accuracy: ratio(
            confusion_matrix.tp + confusion_matrix.tn,
            confusion_matrix.total(),
        ),
        precision: positive.precision,
        recall: positive.recall,
        f1_score: positive.f1_score,
        confusion_matrix,
    })
}

/// Per-class table with accuracy, macro and weighted averages
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub per_class: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn new(y_true: &[Label], y_pred: &[Label]) -> Result<Self> {
        let matrix = ConfusionMatrix::from_predictions(y_true, y_pred)?;
        Ok(Self::from_confusion_matrix(&matrix))
    }

    pub fn from_confusion_matrix(matrix: &ConfusionMatrix) -> Self {
        let per_class = [
            matrix.class_metrics(Label::Negative),
            matrix.class_metrics(Label::Positive),
        ];
        let total = matrix.total();
        let supports = per_class.map(|m| m.support as f64);

        Self {
            per_class,
            accuracy: ratio(matrix.tp + matrix.tn, total),
            macro_avg: average(&per_class, [1.0, 1.0], total),
            weighted_avg: average(&per_class, supports, total),
        }
    }
}

fn average(per_class: &[ClassMetrics; 2], weights: [f64; 2], support: usize) -> ClassMetrics {
    let norm: f64 = weights.iter().sum();
    let mean = |field: fn(&ClassMetrics) -> f64| {
        if norm > 0.0 {
            per_class
                .iter()
                .zip(weights)
                .map(|(m, w)| field(m) * w)
                .sum::<f64>()
                / norm
        } else {
            0.0
        }
    };

    ClassMetrics {
        precision: mean(|m| m.precision),
        recall: mean(|m| m.recall),
        f1_score: mean(|m| m.f1_score),
        support,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = "weighted avg".len();
        let support = self.macro_avg.support;

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1_score, m.support
            )
        };

        for (name, metrics) in TARGET_NAMES.iter().zip(&self.per_class) {
            row(f, *name, metrics)?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}

/// Full text of `classification_report.txt`, headed by the corpus `title`
pub fn classification_report(title: &str, y_true: &[Label], y_pred: &[Label]) -> Result<String> {
    let matrix = ConfusionMatrix::from_predictions(y_true, y_pred)?;
    let report = ClassificationReport::from_confusion_matrix(&matrix);

    Ok(format!(
        "{} Sentiment Analysis - Classification Report\n{}\n\n{}\n\nConfusion Matrix:\n{}",
        title,
        "=".repeat(60),
        report,
        matrix.render()
    ))
}
