use crate::error::{AppError, Result};
use crate::ml::features::SparseVector;
use crate::ml::models::{ClassifierConfig, Label, ModelMetadata};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::{
    LogisticRegression, LogisticRegressionParameters, LogisticRegressionSolverName,
};
use validator::Validate;

/// Trait for binary sentiment classifiers
pub trait Classifier: Send + Sync {
    /// Train the classifier
    fn fit(&mut self, features: &[SparseVector], labels: &[Label]) -> Result<()>;

    /// Predict the class label
    fn predict(&self, features: &SparseVector) -> Result<Label>;

    /// Predict class probabilities, indexed `[negative, positive]`
    fn predict_proba(&self, features: &SparseVector) -> Result<[f64; 2]>;

    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;

    /// Check if model is trained
    fn is_trained(&self) -> bool;
}

/// L2-regularized logistic regression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionClassifier {
    /// Model metadata
    metadata: ModelMetadata,

    /// Model weights, one per feature
    weights: Array1<f64>,

    /// Model bias
    bias: f64,

    /// Is trained
    trained: bool,
}

impl LogisticRegressionClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            metadata: ModelMetadata {
                name: "Logistic Regression".to_string(),
                version: "1.0".to_string(),
                trained_at: chrono::Utc::now(),
                n_training_samples: 0,
                n_features: 0,
                hyperparameters: config,
            },
            weights: Array1::zeros(0),
            bias: 0.0,
            trained: false,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.metadata.hyperparameters
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Raw score `w . x + b`
    pub fn decision_function(&self, features: &SparseVector) -> Result<f64> {
        if !self.trained {
            return Err(AppError::Internal("Model not trained".to_string()));
        }
        if features.dim() != self.weights.len() {
            return Err(AppError::Validation(format!(
                "expected {} features, got {}",
                self.weights.len(),
                features.dim()
            )));
        }

        Ok(features.dot(&self.weights) + self.bias)
    }

    fn to_densematrix(features: &[SparseVector], n_features: usize) -> DenseMatrix<f64> {
        let mut data = vec![0.0; features.len() * n_features];
        for (row, vector) in features.iter().enumerate() {
            for &(col, value) in vector.entries() {
                data[row * n_features + col] = value;
            }
        }
        DenseMatrix::new(features.len(), n_features, data, false)
    }

    fn check_training_input(features: &[SparseVector], labels: &[Label]) -> Result<usize> {
        if features.len() != labels.len() {
            return Err(AppError::Training(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }

        let n_features = features
            .first()
            .map(SparseVector::dim)
            .ok_or_else(|| AppError::Training("No training samples provided".to_string()))?;

        if features.iter().any(|f| f.dim() != n_features) {
            return Err(AppError::Training(
                "Feature rows have inconsistent dimensions".to_string(),
            ));
        }

        for class in [Label::Negative, Label::Positive] {
            if !labels.contains(&class) {
                return Err(AppError::Training(format!(
                    "Training labels contain no {} samples",
                    class
                )));
            }
        }

        Ok(n_features)
    }
}

/// Memory taken by a dense `rows x cols` matrix of f64
pub fn dense_matrix_bytes(rows: usize, cols: usize) -> usize {
    rows.saturating_mul(cols).saturating_mul(std::mem::size_of::<f64>())
}

/// Logistic function, evaluated without overflow for large magnitudes
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticRegressionClassifier {
    fn fit(&mut self, features: &[SparseVector], labels: &[Label]) -> Result<()> {
        self.metadata.hyperparameters.validate()?;
        let n_features = Self::check_training_input(features, labels)?;

        let dense_bytes = dense_matrix_bytes(features.len(), n_features);
        tracing::info!(
            rows = features.len(),
            cols = n_features,
            "Densifying training matrix (~{:.1} MiB of f64)",
            dense_bytes as f64 / (1024.0 * 1024.0)
        );

        // Convert to smartcore format
        let x = Self::to_densematrix(features, n_features);
        let y: Vec<i32> = labels.iter().map(|l| l.as_index() as i32).collect();

        // smartcore's alpha is the L2 penalty, the inverse of C
        let params = LogisticRegressionParameters::default()
            .with_solver(LogisticRegressionSolverName::LBFGS)
            .with_alpha(1.0 / self.metadata.hyperparameters.c);

        let model = LogisticRegression::fit(&x, &y, params).map_err(|e| {
            AppError::Training(format!("Failed to train logistic regression: {}", e))
        })?;

        // Classes are sorted, so the single coefficient row scores the positive class
        let coefficients = model.coefficients();
        self.weights = (0..n_features)
            .map(|j| *coefficients.get((0, j)))
            .collect::<Array1<f64>>();
        self.bias = *model.intercept().get((0, 0));
        self.trained = true;

        self.metadata.n_training_samples = features.len();
        self.metadata.n_features = n_features;
        self.metadata.trained_at = chrono::Utc::now();

        tracing::debug!(
            samples = features.len(),
            features = n_features,
            bias = self.bias,
            "Trained logistic regression"
        );

        Ok(())
    }

    fn predict(&self, features: &SparseVector) -> Result<Label> {
        let [negative, positive] = self.predict_proba(features)?;
        Ok(if positive > negative {
            Label::Positive
        } else {
            Label::Negative
        })
    }

    fn predict_proba(&self, features: &SparseVector) -> Result<[f64; 2]> {
        let positive = sigmoid(self.decision_function(features)?);
        Ok([1.0 - positive, positive])
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn is_trained(&self) -> bool {
        self.trained
    }
}
