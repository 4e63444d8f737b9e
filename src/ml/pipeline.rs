use crate::error::{AppError, Result};
use crate::ml::classifier::Classifier;
use crate::ml::features::FeatureExtractor;
use crate::ml::models::PredictionResult;
use crate::ml::preprocess;

/// Fitted feature extractor and classifier, applied together to raw text
pub struct SentimentPipeline {
    extractor: Box<dyn FeatureExtractor>,
    classifier: Box<dyn Classifier>,
}

impl SentimentPipeline {
    /// Both parts must be fitted and agree on the feature dimension.
    pub fn new(
        extractor: Box<dyn FeatureExtractor>,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self> {
        if !extractor.is_fitted() {
            return Err(AppError::Validation(
                "Feature extractor is not fitted".to_string(),
            ));
        }
        if !classifier.is_trained() {
            return Err(AppError::Validation("Classifier is not trained".to_string()));
        }

        let expected = classifier.metadata().n_features;
        if extractor.n_features() != expected {
            return Err(AppError::Validation(format!(
                "Feature extractor produces {} features but the classifier expects {}",
                extractor.n_features(),
                expected
            )));
        }

        Ok(Self {
            extractor,
            classifier,
        })
    }

    /// Normalize, vectorize and classify one review
    pub fn predict(&self, text: &str) -> Result<PredictionResult> {
        predict_with(self.extractor.as_ref(), self.classifier.as_ref(), text)
    }

    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<PredictionResult>> {
        texts.iter().map(|t| self.predict(t.as_ref())).collect()
    }

    pub fn extractor(&self) -> &dyn FeatureExtractor {
        self.extractor.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

/// Classify raw text with borrowed, fitted parts
pub fn predict_with(
    extractor: &dyn FeatureExtractor,
    classifier: &dyn Classifier,
    text: &str,
) -> Result<PredictionResult> {
    let cleaned = preprocess::normalize(text);
    let features = extractor.transform(&cleaned)?;
    let proba = classifier.predict_proba(&features)?;
    let sentiment = classifier.predict(&features)?;

    Ok(PredictionResult::new(text, sentiment, proba))
}
