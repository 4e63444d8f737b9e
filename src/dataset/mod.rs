//! Labeled review datasets.
//!
//! A [`DatasetSource`] produces the train and test splits consumed by the
//! training orchestrator. Two on-disk layouts are supported:
//! - the aclImdb directory tree (`train/pos`, `train/neg`, `test/pos`, `test/neg`)
//! - JSON-lines files with one `{"text": ..., "label": 0|1}` object per line

pub mod imdb;
pub mod jsonl;

pub use imdb::ImdbDirectorySource;
pub use jsonl::JsonlSource;

use crate::error::{AppError, Result};
use crate::ml::models::{Label, Review};

/// Train and test splits of a labeled corpus
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetSplits {
    pub train: Vec<Review>,
    pub test: Vec<Review>,
}

impl DatasetSplits {
    pub fn new(train: Vec<Review>, test: Vec<Review>) -> Self {
        Self { train, test }
    }

    /// Both splits must contain at least one review
    pub fn validate(&self) -> Result<()> {
        if self.train.is_empty() {
            return Err(AppError::Dataset("Training split is empty".to_string()));
        }
        if self.test.is_empty() {
            return Err(AppError::Dataset("Test split is empty".to_string()));
        }
        Ok(())
    }

    pub fn train_texts(&self) -> Vec<&str> {
        self.train.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn test_texts(&self) -> Vec<&str> {
        self.test.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn train_labels(&self) -> Vec<Label> {
        self.train.iter().map(|r| r.label).collect()
    }

    pub fn test_labels(&self) -> Vec<Label> {
        self.test.iter().map(|r| r.label).collect()
    }
}

/// Source of labeled reviews
pub trait DatasetSource {
    /// Human readable dataset name, recorded in the training report
    fn name(&self) -> &str;

    /// Load both splits
    fn load(&self) -> Result<DatasetSplits>;
}

impl<T: DatasetSource + ?Sized> DatasetSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load(&self) -> Result<DatasetSplits> {
        (**self).load()
    }
}

/// Splits held in memory
#[derive(Debug, Clone)]
pub struct InMemorySource {
    name: String,
    splits: DatasetSplits,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, splits: DatasetSplits) -> Self {
        Self {
            name: name.into(),
            splits,
        }
    }
}

impl DatasetSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<DatasetSplits> {
        Ok(self.splits.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_splits_rejected() {
        let splits = DatasetSplits::new(vec![Review::new("fine", Label::Positive)], vec![]);
        let err = splits.validate().unwrap_err();
        assert!(matches!(err, AppError::Dataset(_)));

        assert!(DatasetSplits::default().validate().is_err());
    }

    #[test]
    fn test_split_accessors() {
        let splits = DatasetSplits::new(
            vec![
                Review::new("good", Label::Positive),
                Review::new("bad", Label::Negative),
            ],
            vec![Review::new("meh", Label::Negative)],
        );

        assert!(splits.validate().is_ok());
        assert_eq!(splits.train_texts(), vec!["good", "bad"]);
        assert_eq!(splits.train_labels(), vec![Label::Positive, Label::Negative]);
        assert_eq!(splits.test_texts(), vec!["meh"]);
        assert_eq!(splits.test_labels(), vec![Label::Negative]);
    }

    #[test]
    fn test_in_memory_source() {
        let splits = DatasetSplits::new(
            vec![Review::new("good", Label::Positive)],
            vec![Review::new("bad", Label::Negative)],
        );
        let source = InMemorySource::new("toy", splits.clone());

        assert_eq!(source.name(), "toy");
        assert_eq!(source.load().unwrap(), splits);
    }
}
